//! Nested, insertion-ordered groups of arrays that unified functions map over
//! leaf by leaf.

use std::fmt::{Display, Formatter};
use std::ops::{Add, Mul, Neg, Sub};

use crate::api::{self, CallOptions};
use crate::array::{Array, InplaceMode};
use crate::backends::ndarray_backend::NDArrayNumericTensor;
use crate::error::ArrayError;
use crate::func_wrapper::invocation::Value;
use crate::native_array::NativeArray;
use crate::numeric_scalar::NumericScalar;

#[derive(Debug, Clone)]
pub enum Leaf {
    Array(Array),
    Native(NativeArray),
    Scalar(NumericScalar),
}

impl Leaf {
    fn describe(&self) -> String {
        match self {
            Leaf::Array(x) => x.to_string(),
            Leaf::Native(x) => format!(
                "native(shape={:?}, dtype={}, backend={})",
                x.shape(),
                x.dtype(),
                x.backend_kind()
            ),
            Leaf::Scalar(x) => format!("{x} ({})", x.dtype()),
        }
    }

    /// A copy whose arrays share no storage with `self`.
    pub(crate) fn deep_copy(&self) -> Leaf {
        match self {
            Leaf::Array(x) => Leaf::Array(Array::from_native(x.native().deep_copy())),
            Leaf::Native(x) => Leaf::Native(x.deep_copy()),
            Leaf::Scalar(x) => Leaf::Scalar(*x),
        }
    }

    fn to_json(&self) -> Result<serde_json::Value, ArrayError> {
        match self {
            Leaf::Array(x) => x.to_list(),
            Leaf::Native(x) => Ok(x.to_ndarray()?.to_json()),
            Leaf::Scalar(x) => Ok(x.to_json()),
        }
    }
}

impl From<Leaf> for Value {
    fn from(value: Leaf) -> Self {
        match value {
            Leaf::Array(x) => Value::Array(x),
            Leaf::Native(x) => Value::Native(x),
            Leaf::Scalar(x) => Value::Scalar(x),
        }
    }
}

impl TryFrom<Value> for Leaf {
    type Error = ArrayError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Array(x) => Ok(Leaf::Array(x)),
            Value::Native(x) => Ok(Leaf::Native(x)),
            Value::Scalar(x) => Ok(Leaf::Scalar(x)),
            Value::Int(x) => Ok(Leaf::Scalar(NumericScalar::I64(x))),
            Value::Bool(x) => Ok(Leaf::Scalar(NumericScalar::BOOL(x))),
            other => Err(ArrayError::Value(format!(
                "a {} cannot be stored as a container leaf",
                other.type_name()
            ))),
        }
    }
}

/// One position in a container: a leaf, an ordered sequence, or a nested
/// container.
#[derive(Debug, Clone)]
pub enum Item {
    Leaf(Leaf),
    Sequence(Vec<Item>),
    Node(Container),
}

impl Item {
    fn kind_name(&self) -> &'static str {
        match self {
            Item::Leaf(_) => "leaf",
            Item::Sequence(_) => "sequence",
            Item::Node(_) => "container",
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Item::Leaf(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Item::Leaf(Leaf::Array(x)) => Some(x),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Item::Node(x) => Some(x),
            _ => None,
        }
    }

    fn to_json(&self) -> Result<serde_json::Value, ArrayError> {
        match self {
            Item::Leaf(x) => x.to_json(),
            Item::Sequence(items) => Ok(serde_json::Value::Array(
                items.iter().map(Item::to_json).collect::<Result<_, _>>()?,
            )),
            Item::Node(x) => x.to_json(),
        }
    }

    fn from_json(value: serde_json::Value) -> Result<Self, ArrayError> {
        match value {
            serde_json::Value::Bool(b) => Ok(Item::Leaf(Leaf::Scalar(NumericScalar::BOOL(b)))),
            serde_json::Value::Number(n) => {
                let scalar = if let Some(i) = n.as_i64() {
                    NumericScalar::I64(i)
                } else if let Some(u) = n.as_u64() {
                    NumericScalar::U64(u)
                } else {
                    NumericScalar::F64(n.as_f64().unwrap_or(f64::NAN))
                };
                Ok(Item::Leaf(Leaf::Scalar(scalar)))
            }
            serde_json::Value::Array(items) => {
                let items = items.into_iter().map(Item::from_json).collect::<Result<Vec<_>, _>>()?;
                match numeric_literal(&items) {
                    Some(literal) => Ok(Item::Leaf(Leaf::Array(api::asarray(literal, CallOptions::new())?))),
                    None => Ok(Item::Sequence(items)),
                }
            }
            serde_json::Value::Object(_) => Ok(Item::Node(Container::try_from(value)?)),
            serde_json::Value::Null | serde_json::Value::String(_) => Err(ArrayError::Value(format!(
                "cannot build a container item from {value}"
            ))),
        }
    }
}

/// A non-empty, rectangular list of numbers becomes an array.
fn numeric_literal(items: &[Item]) -> Option<Value> {
    fn literal(item: &Item) -> Option<Value> {
        match item {
            Item::Leaf(Leaf::Scalar(s)) => Some(Value::Scalar(*s)),
            Item::Leaf(Leaf::Array(x)) => {
                let host = x.to_host().ok()?;
                nest(&host)
            }
            _ => None,
        }
    }
    fn nest(host: &NDArrayNumericTensor) -> Option<Value> {
        fn build(values: &[NumericScalar], shape: &[usize]) -> Value {
            match shape.split_first() {
                None => values.first().map(|s| Value::Scalar(*s)).unwrap_or(Value::None),
                Some((&len, rest)) => {
                    let stride: usize = rest.iter().product();
                    Value::List((0..len).map(|i| build(&values[i * stride..(i + 1) * stride], rest)).collect())
                }
            }
        }
        Some(build(&host.to_scalars(), &host.shape()))
    }
    if items.is_empty() {
        return None;
    }
    let list = Value::List(items.iter().map(literal).collect::<Option<Vec<_>>>()?);
    list.flatten_numeric().ok()?;
    Some(list)
}

impl From<Leaf> for Item {
    fn from(value: Leaf) -> Self {
        Item::Leaf(value)
    }
}

impl From<Array> for Item {
    fn from(value: Array) -> Self {
        Item::Leaf(Leaf::Array(value))
    }
}

impl From<NativeArray> for Item {
    fn from(value: NativeArray) -> Self {
        Item::Leaf(Leaf::Native(value))
    }
}

impl From<NumericScalar> for Item {
    fn from(value: NumericScalar) -> Self {
        Item::Leaf(Leaf::Scalar(value))
    }
}

impl From<Container> for Item {
    fn from(value: Container) -> Self {
        Item::Node(value)
    }
}

impl From<Vec<Item>> for Item {
    fn from(value: Vec<Item>) -> Self {
        Item::Sequence(value)
    }
}

/// Restricts a mapping to part of a container. Key chains are dot-separated
/// paths (`"a.x"`, `"b.0"`); a chain also selects everything below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyChainFilter {
    Include(Vec<String>),
    Exclude(Vec<String>),
}

impl KeyChainFilter {
    fn matches(chains: &[String], chain: &str) -> bool {
        chains.iter().any(|c| {
            chain == c || (chain.starts_with(c.as_str()) && chain[c.len()..].starts_with('.'))
        })
    }

    pub fn applies_to(&self, chain: &str) -> bool {
        match self {
            KeyChainFilter::Include(chains) => Self::matches(chains, chain),
            KeyChainFilter::Exclude(chains) => !Self::matches(chains, chain),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapOptions {
    pub key_chains: Option<KeyChainFilter>,
    /// Drop leaves the filter excludes instead of copying them through.
    pub prune_unapplied: bool,
    /// Map over the items of nested sequences instead of copying them.
    pub map_sequences: bool,
}

impl MapOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include(mut self, chains: &[&str]) -> Self {
        self.key_chains = Some(KeyChainFilter::Include(chains.iter().map(|c| c.to_string()).collect()));
        self
    }

    pub fn exclude(mut self, chains: &[&str]) -> Self {
        self.key_chains = Some(KeyChainFilter::Exclude(chains.iter().map(|c| c.to_string()).collect()));
        self
    }

    pub fn prune_unapplied(mut self, prune: bool) -> Self {
        self.prune_unapplied = prune;
        self
    }

    pub fn map_sequences(mut self, map: bool) -> Self {
        self.map_sequences = map;
        self
    }

    fn applies_to(&self, chain: &str) -> bool {
        self.key_chains.as_ref().is_none_or(|f| f.applies_to(chain))
    }
}

fn join_chain(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn mismatch(path: &str, detail: String) -> ArrayError {
    ArrayError::StructureMismatch {
        path: path.to_string(),
        detail,
    }
}

/// Insertion-ordered mapping from string keys to [`Item`]s.
#[derive(Debug, Clone, Default)]
pub struct Container {
    entries: Vec<(String, Item)>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Container::insert`].
    pub fn with(mut self, key: impl Into<String>, item: impl Into<Item>) -> Self {
        self.insert(key, item);
        self
    }

    /// Insert or replace `key`. A replaced key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, item: impl Into<Item>) {
        let key = key.into();
        let item = item.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = item,
            None => self.entries.push((key, item)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Item> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn get(&self, key: &str) -> Option<&Item> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut Item> {
        self.entries.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Item)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Key chains of every leaf, in traversal order. Sequence items are
    /// addressed by index.
    pub fn key_chains(&self) -> Vec<String> {
        fn walk(item: &Item, chain: String, out: &mut Vec<String>) {
            match item {
                Item::Leaf(_) => out.push(chain),
                Item::Sequence(items) => items
                    .iter()
                    .enumerate()
                    .for_each(|(i, v)| walk(v, join_chain(&chain, &i.to_string()), out)),
                Item::Node(c) => c
                    .entries
                    .iter()
                    .for_each(|(k, v)| walk(v, join_chain(&chain, k), out)),
            }
        }
        let mut out = Vec::new();
        self.entries.iter().for_each(|(k, v)| walk(v, k.clone(), &mut out));
        out
    }

    pub fn at_key_chain(&self, chain: &str) -> Option<&Item> {
        let mut parts = chain.split('.');
        let mut item = self.get(parts.next()?)?;
        for part in parts {
            item = match item {
                Item::Node(c) => c.get(part)?,
                Item::Sequence(items) => items.get(part.parse::<usize>().ok()?)?,
                Item::Leaf(_) => return None,
            };
        }
        Some(item)
    }

    /// Set the item at `chain`, creating intermediate containers as needed.
    pub fn set_at_key_chain(&mut self, chain: &str, item: impl Into<Item>) -> Result<(), ArrayError> {
        match chain.split_once('.') {
            None => {
                self.insert(chain, item);
                Ok(())
            }
            Some((head, rest)) => {
                if self.get(head).is_none() {
                    self.insert(head, Container::new());
                }
                match self.get_mut(head) {
                    Some(Item::Node(c)) => c.set_at_key_chain(rest, item),
                    Some(Item::Sequence(items)) => {
                        let (index, rest) = match rest.split_once('.') {
                            Some((index, rest)) => (index, Some(rest)),
                            None => (rest, None),
                        };
                        let slot = index
                            .parse::<usize>()
                            .ok()
                            .and_then(|i| items.get_mut(i))
                            .ok_or_else(|| mismatch(chain, format!("no sequence item {index}")))?;
                        match (rest, slot) {
                            (None, slot) => {
                                *slot = item.into();
                                Ok(())
                            }
                            (Some(rest), Item::Node(c)) => c.set_at_key_chain(rest, item),
                            (Some(_), other) => {
                                Err(mismatch(chain, format!("cannot descend into a {}", other.kind_name())))
                            }
                        }
                    }
                    Some(other) => Err(mismatch(chain, format!("cannot descend into a {}", other.kind_name()))),
                    None => Err(mismatch(chain, "missing key".to_string())),
                }
            }
        }
    }

    /// Apply `f` to every leaf, rebuilding the same structure.
    pub fn map<F, E>(&self, mut f: F, options: &MapOptions) -> Result<Container, E>
    where
        F: FnMut(&Leaf, &str) -> Result<Leaf, E>,
        E: From<ArrayError>,
    {
        Container::multi_map(&[self], |leaves, chain| f(leaves[0], chain), options)
    }

    /// Apply `f` to corresponding leaves of congruent containers.
    ///
    /// Differing key sets, sequence lengths or item kinds at the same position
    /// fail with a structure mismatch. The output follows the key order of the
    /// first container.
    pub fn multi_map<F, E>(containers: &[&Container], mut f: F, options: &MapOptions) -> Result<Container, E>
    where
        F: FnMut(&[&Leaf], &str) -> Result<Leaf, E>,
        E: From<ArrayError>,
    {
        if containers.is_empty() {
            return Err(ArrayError::Value("multi_map needs at least one container".to_string()).into());
        }
        map_node(containers, "", &mut f, options)
    }

    /// Fail unless every container has the structure of the first.
    pub fn assert_identical_structure(containers: &[&Container]) -> Result<(), ArrayError> {
        Container::multi_map::<_, ArrayError>(
            containers,
            |leaves, _| Ok(leaves[0].clone()),
            &MapOptions::new().map_sequences(true),
        )
        .map(|_| ())
    }

    /// Write the leaves of `other` into the matching leaves of `self`. Array
    /// leaves are updated in place where the backend allows, otherwise
    /// rebound; every other leaf is replaced.
    pub fn inplace_update(&mut self, other: &Container) -> Result<(), ArrayError> {
        Container::assert_identical_structure(&[&*self, other])?;
        for chain in other.key_chains() {
            let Some(Item::Leaf(source)) = other.at_key_chain(&chain) else {
                continue;
            };
            match (self.at_key_chain_mut(&chain), source) {
                (Some(Item::Leaf(Leaf::Array(target))), Leaf::Array(value)) => {
                    target.inplace_update(value, InplaceMode::BestEffort)?;
                }
                (Some(slot), source) => *slot = Item::Leaf(source.clone()),
                (None, _) => return Err(mismatch(&chain, "missing key".to_string())),
            }
        }
        Ok(())
    }

    fn at_key_chain_mut(&mut self, chain: &str) -> Option<&mut Item> {
        let mut parts = chain.split('.');
        let mut item = self.get_mut(parts.next()?)?;
        for part in parts {
            item = match item {
                Item::Node(c) => c.get_mut(part)?,
                Item::Sequence(items) => items.get_mut(part.parse::<usize>().ok()?)?,
                Item::Leaf(_) => return None,
            };
        }
        Some(item)
    }

    /// Nested JSON: containers become objects, arrays nested lists.
    pub fn to_json(&self) -> Result<serde_json::Value, ArrayError> {
        let mut map = serde_json::Map::new();
        for (k, v) in &self.entries {
            map.insert(k.clone(), v.to_json()?);
        }
        Ok(serde_json::Value::Object(map))
    }

    pub fn from_json_str(json: &str) -> Result<Self, ArrayError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| ArrayError::Value(format!("invalid container literal: {e}")))?;
        Container::try_from(value)
    }

    pub fn negative(&self) -> Result<Container, ArrayError> {
        api::negative(self, CallOptions::new())
    }

    pub fn abs(&self) -> Result<Container, ArrayError> {
        api::abs(self, CallOptions::new())
    }

    pub fn sum(&self) -> Result<Container, ArrayError> {
        api::sum(self, None, false, CallOptions::new())
    }

    pub fn mean(&self) -> Result<Container, ArrayError> {
        api::mean(self, None, false, CallOptions::new())
    }
}

fn map_item<F, E>(items: &[&Item], chain: &str, f: &mut F, options: &MapOptions) -> Result<Option<Item>, E>
where
    F: FnMut(&[&Leaf], &str) -> Result<Leaf, E>,
    E: From<ArrayError>,
{
    match items[0] {
        Item::Leaf(first) => {
            let mut leaves = vec![first];
            for item in &items[1..] {
                match item {
                    Item::Leaf(leaf) => leaves.push(leaf),
                    other => {
                        return Err(mismatch(chain, format!("expected a leaf, found a {}", other.kind_name())).into());
                    }
                }
            }
            if options.applies_to(chain) {
                Ok(Some(Item::Leaf(f(&leaves, chain)?)))
            } else if options.prune_unapplied {
                Ok(None)
            } else {
                Ok(Some(Item::Leaf(first.clone())))
            }
        }
        Item::Sequence(first) => {
            let mut sequences = vec![first];
            for item in &items[1..] {
                match item {
                    Item::Sequence(s) if s.len() == first.len() => sequences.push(s),
                    Item::Sequence(s) => {
                        return Err(mismatch(
                            chain,
                            format!("sequence lengths differ ({} vs {})", first.len(), s.len()),
                        )
                        .into());
                    }
                    other => {
                        return Err(
                            mismatch(chain, format!("expected a sequence, found a {}", other.kind_name())).into()
                        );
                    }
                }
            }
            if !options.map_sequences {
                // an untraversed sequence is filtered as a single unit
                if !options.applies_to(chain) && options.prune_unapplied {
                    return Ok(None);
                }
                return Ok(Some(Item::Sequence(first.clone())));
            }
            let mut out = Vec::with_capacity(first.len());
            for i in 0..first.len() {
                let column: Vec<&Item> = sequences.iter().map(|s| &s[i]).collect();
                if let Some(item) = map_item(&column, &join_chain(chain, &i.to_string()), f, options)? {
                    out.push(item);
                }
            }
            if out.is_empty() && options.prune_unapplied && !first.is_empty() {
                return Ok(None);
            }
            Ok(Some(Item::Sequence(out)))
        }
        Item::Node(_) => {
            let mut nodes = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Item::Node(c) => nodes.push(c),
                    other => {
                        return Err(
                            mismatch(chain, format!("expected a container, found a {}", other.kind_name())).into()
                        );
                    }
                }
            }
            let mapped = map_node(&nodes, chain, f, options)?;
            if mapped.is_empty() && options.prune_unapplied && !nodes[0].is_empty() {
                return Ok(None);
            }
            Ok(Some(Item::Node(mapped)))
        }
    }
}

fn map_node<F, E>(nodes: &[&Container], chain: &str, f: &mut F, options: &MapOptions) -> Result<Container, E>
where
    F: FnMut(&[&Leaf], &str) -> Result<Leaf, E>,
    E: From<ArrayError>,
{
    let first = nodes[0];
    for other in &nodes[1..] {
        let congruent = other.len() == first.len() && first.keys().all(|k| other.get(k).is_some());
        if !congruent {
            return Err(mismatch(
                chain,
                format!(
                    "key sets differ ({:?} vs {:?})",
                    first.keys().collect::<Vec<_>>(),
                    other.keys().collect::<Vec<_>>()
                ),
            )
            .into());
        }
    }
    let mut out = Container::new();
    for (key, item) in &first.entries {
        let mut column = vec![item];
        // congruence was checked above
        column.extend(nodes[1..].iter().filter_map(|c| c.get(key)));
        if let Some(mapped) = map_item(&column, &join_chain(chain, key), f, options)? {
            out.entries.push((key.clone(), mapped));
        }
    }
    Ok(out)
}

impl TryFrom<serde_json::Value> for Container {
    type Error = ArrayError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Object(map) => {
                let mut container = Container::new();
                for (k, v) in map {
                    container.insert(k, Item::from_json(v)?);
                }
                Ok(container)
            }
            other => Err(ArrayError::Value(format!("a container literal must be an object, got {other}"))),
        }
    }
}

impl Display for Container {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        fn write_item(f: &mut Formatter<'_>, item: &Item, depth: usize) -> std::fmt::Result {
            match item {
                Item::Leaf(leaf) => write!(f, "{}", leaf.describe()),
                Item::Sequence(items) => {
                    writeln!(f, "[")?;
                    for item in items {
                        write!(f, "{}", "    ".repeat(depth + 1))?;
                        write_item(f, item, depth + 1)?;
                        writeln!(f, ",")?;
                    }
                    write!(f, "{}]", "    ".repeat(depth))
                }
                Item::Node(c) => write_node(f, c, depth),
            }
        }
        fn write_node(f: &mut Formatter<'_>, c: &Container, depth: usize) -> std::fmt::Result {
            writeln!(f, "{{")?;
            for (k, v) in &c.entries {
                write!(f, "{}{k}: ", "    ".repeat(depth + 1))?;
                write_item(f, v, depth + 1)?;
                writeln!(f, ",")?;
            }
            write!(f, "{}}}", "    ".repeat(depth))
        }
        write_node(f, self, 0)
    }
}

impl Add<&Container> for &Container {
    type Output = Result<Container, ArrayError>;

    fn add(self, rhs: &Container) -> Self::Output {
        api::add(self, rhs, CallOptions::new())
    }
}

impl Sub<&Container> for &Container {
    type Output = Result<Container, ArrayError>;

    fn sub(self, rhs: &Container) -> Self::Output {
        api::subtract(self, rhs, CallOptions::new())
    }
}

impl Mul<&Container> for &Container {
    type Output = Result<Container, ArrayError>;

    fn mul(self, rhs: &Container) -> Self::Output {
        api::multiply(self, rhs, CallOptions::new())
    }
}

impl Neg for &Container {
    type Output = Result<Container, ArrayError>;

    fn neg(self) -> Self::Output {
        api::negative(self, CallOptions::new())
    }
}
