use super::inference;
use crate::array::Array;
use crate::backends::ndarray_backend::NDArrayNumericTensor;
use crate::checks;
use crate::container::Container;
use crate::device::Device;
use crate::dtype::DType;
use crate::error::ArrayError;
use crate::native_array::NativeArray;
use crate::numeric_scalar::NumericScalar;

/// A positional argument, keyword parameter or return value flowing through
/// the wrapping pipeline.
#[derive(Debug, Clone)]
pub enum Value {
    Array(Array),
    Native(NativeArray),
    Container(Container),
    Scalar(NumericScalar),
    Shape(Vec<usize>),
    Axes(Vec<i64>),
    Int(i64),
    Bool(bool),
    List(Vec<Value>),
    None,
}

impl Value {
    /// Nested host data: `Value::List` of lists or scalars.
    pub fn from_vec<T: Into<NumericScalar>>(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(|v| Value::Scalar(v.into())).collect())
    }

    pub fn is_array_like(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Native(_))
    }

    pub fn as_native(&self) -> Option<&NativeArray> {
        match self {
            Value::Array(x) => Some(x.native()),
            Value::Native(x) => Some(x),
            _ => None,
        }
    }

    pub fn into_array(self) -> Result<Array, ArrayError> {
        match self {
            Value::Array(x) => Ok(x),
            Value::Native(x) => Ok(Array::from_native(x)),
            other => Err(ArrayError::Value(format!("expected an array, got {}", other.type_name()))),
        }
    }

    pub fn into_container(self) -> Result<Container, ArrayError> {
        match self {
            Value::Container(x) => Ok(x),
            other => Err(ArrayError::Value(format!(
                "expected a container, got {}",
                other.type_name()
            ))),
        }
    }

    pub fn into_bool(self) -> Result<bool, ArrayError> {
        match self {
            Value::Bool(x) => Ok(x),
            other => Err(ArrayError::Value(format!("expected a bool, got {}", other.type_name()))),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Array(_) => "array",
            Value::Native(_) => "native array",
            Value::Container(_) => "container",
            Value::Scalar(_) => "scalar",
            Value::Shape(_) => "shape",
            Value::Axes(_) => "axes",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::List(_) => "list",
            Value::None => "none",
        }
    }

    /// Flatten nested lists of scalars into row-major values and a shape.
    /// Ragged nesting is a shape error.
    pub fn flatten_numeric(&self) -> Result<(Vec<NumericScalar>, Vec<usize>), ArrayError> {
        fn walk(value: &Value, out: &mut Vec<NumericScalar>) -> Result<Vec<usize>, ArrayError> {
            match value {
                Value::Scalar(s) => out.push(*s),
                Value::Int(i) => out.push(NumericScalar::I64(*i)),
                Value::Bool(b) => out.push(NumericScalar::BOOL(*b)),
                Value::List(items) => {
                    let mut inner: Option<Vec<usize>> = None;
                    for item in items {
                        let shape = walk(item, out)?;
                        if let Some(expected) = &inner {
                            checks::check_shape(expected, &shape)?;
                        }
                        inner.get_or_insert(shape);
                    }
                    let mut shape = vec![items.len()];
                    shape.extend(inner.unwrap_or_default());
                    return Ok(shape);
                }
                other => {
                    return Err(ArrayError::Value(format!(
                        "cannot build an array from a {}",
                        other.type_name()
                    )));
                }
            }
            Ok(Vec::new())
        }
        let mut out = Vec::new();
        let shape = walk(self, &mut out)?;
        Ok((out, shape))
    }
}

impl From<Array> for Value {
    fn from(value: Array) -> Self {
        Value::Array(value)
    }
}

impl From<&Array> for Value {
    fn from(value: &Array) -> Self {
        Value::Array(value.clone())
    }
}

impl From<NativeArray> for Value {
    fn from(value: NativeArray) -> Self {
        Value::Native(value)
    }
}

impl From<Container> for Value {
    fn from(value: Container) -> Self {
        Value::Container(value)
    }
}

impl From<&Container> for Value {
    fn from(value: &Container) -> Self {
        Value::Container(value.clone())
    }
}

impl From<NumericScalar> for Value {
    fn from(value: NumericScalar) -> Self {
        Value::Scalar(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

/// Caller-provided destination buffer.
#[derive(Debug)]
pub enum OutArg<'a> {
    Array(&'a mut Array),
    Container(&'a mut Container),
}

/// One call travelling down the layer chain.
#[derive(Debug)]
pub struct Invocation<'a> {
    pub args: Vec<Value>,
    pub params: Vec<(&'static str, Value)>,
    /// Explicit dtype from the caller, replaced by the inferred one once the
    /// dtype layer has run.
    pub dtype: Option<DType>,
    pub device: Option<Device>,
    pub out: Option<OutArg<'a>>,
}

impl<'a> Invocation<'a> {
    pub fn new(args: Vec<Value>) -> Self {
        Self {
            args,
            params: Vec::new(),
            dtype: None,
            device: None,
            out: None,
        }
    }

    pub fn with_param(mut self, name: &'static str, value: impl Into<Value>) -> Self {
        self.params.push((name, value.into()));
        self
    }

    pub fn with_dtype(mut self, dtype: Option<DType>) -> Self {
        self.dtype = dtype;
        self
    }

    pub fn with_device(mut self, device: Option<Device>) -> Self {
        self.device = device;
        self
    }

    pub fn with_out(mut self, out: Option<OutArg<'a>>) -> Self {
        self.out = out;
        self
    }

    /// Same arguments and parameters, no output buffer.
    pub(crate) fn detached<'b>(&self, args: Vec<Value>) -> Invocation<'b> {
        Invocation {
            args,
            params: self.params.clone(),
            dtype: self.dtype,
            device: self.device,
            out: None,
        }
    }

    pub fn arg(&self, index: usize) -> Result<&Value, ArrayError> {
        self.args
            .get(index)
            .ok_or_else(|| ArrayError::Value(format!("missing positional argument {index}")))
    }

    pub fn native(&self, index: usize) -> Result<&NativeArray, ArrayError> {
        let value = self.arg(index)?;
        value.as_native().ok_or_else(|| {
            ArrayError::Value(format!(
                "argument {index} must be an array, got {}",
                value.type_name()
            ))
        })
    }

    /// An array argument, with a bare scalar promoted to a rank-0 host array.
    pub fn operand(&self, index: usize) -> Result<NativeArray, ArrayError> {
        match self.arg(index)? {
            Value::Scalar(_) | Value::Int(_) | Value::Bool(_) => {
                let s = self.scalar(index)?;
                Ok(NativeArray::NDArray(NDArrayNumericTensor::from_scalars(&[s], &[], s.dtype())?))
            }
            _ => Ok(self.native(index)?.clone()),
        }
    }

    pub fn scalar(&self, index: usize) -> Result<NumericScalar, ArrayError> {
        match self.arg(index)? {
            Value::Scalar(s) => Ok(*s),
            Value::Int(i) => Ok(NumericScalar::I64(*i)),
            Value::Bool(b) => Ok(NumericScalar::BOOL(*b)),
            other => Err(ArrayError::Value(format!(
                "argument {index} must be a scalar, got {}",
                other.type_name()
            ))),
        }
    }

    pub fn int_arg(&self, index: usize) -> Result<i64, ArrayError> {
        match self.arg(index)? {
            Value::Int(i) => Ok(*i),
            other => Err(ArrayError::Value(format!(
                "argument {index} must be an int, got {}",
                other.type_name()
            ))),
        }
    }

    pub fn shape_arg(&self, index: usize) -> Result<Vec<usize>, ArrayError> {
        match self.arg(index)? {
            Value::Shape(s) => Ok(s.clone()),
            other => Err(ArrayError::Value(format!(
                "argument {index} must be a shape, got {}",
                other.type_name()
            ))),
        }
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn param_int(&self, name: &str, default: i64) -> Result<i64, ArrayError> {
        match self.param(name) {
            None | Some(Value::None) => Ok(default),
            Some(Value::Int(i)) => Ok(*i),
            Some(other) => Err(ArrayError::Value(format!(
                "parameter {name} must be an int, got {}",
                other.type_name()
            ))),
        }
    }

    pub fn param_bool(&self, name: &str, default: bool) -> Result<bool, ArrayError> {
        match self.param(name) {
            None | Some(Value::None) => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(ArrayError::Value(format!(
                "parameter {name} must be a bool, got {}",
                other.type_name()
            ))),
        }
    }

    pub fn param_axes(&self, name: &str) -> Result<Option<Vec<i64>>, ArrayError> {
        match self.param(name) {
            None | Some(Value::None) => Ok(None),
            Some(Value::Axes(a)) => Ok(Some(a.clone())),
            Some(Value::Int(i)) => Ok(Some(vec![*i])),
            Some(other) => Err(ArrayError::Value(format!(
                "parameter {name} must be axes, got {}",
                other.type_name()
            ))),
        }
    }

    pub fn param_shape(&self, name: &str) -> Result<Vec<usize>, ArrayError> {
        match self.param(name) {
            Some(Value::Shape(s)) => Ok(s.clone()),
            Some(other) => Err(ArrayError::Value(format!(
                "parameter {name} must be a shape, got {}",
                other.type_name()
            ))),
            None => Err(ArrayError::Value(format!("missing parameter {name}"))),
        }
    }

    /// The explicit or inferred dtype, else the promotion of the array
    /// arguments' dtypes, lifted by any literal of a stronger kind.
    pub fn resolved_dtype(&self) -> Result<DType, ArrayError> {
        if let Some(dtype) = self.dtype {
            return Ok(dtype);
        }
        let literals = inference::strongest_literal(self);
        match self.array_args().into_iter().map(|x| x.dtype()).reduce(DType::promote_types) {
            Some(dtype) => Ok(inference::promote_with_literals(dtype, literals)),
            None => Err(ArrayError::Value("no dtype was resolved for this call".to_string())),
        }
    }

    pub fn resolved_device(&self) -> Device {
        self.device.unwrap_or_default()
    }

    /// Arrays among the positional arguments, including inside lists.
    pub fn array_args(&self) -> Vec<&NativeArray> {
        fn collect<'v>(value: &'v Value, out: &mut Vec<&'v NativeArray>) {
            match value {
                Value::List(items) => items.iter().for_each(|v| collect(v, out)),
                other => out.extend(other.as_native()),
            }
        }
        let mut out = Vec::new();
        self.args.iter().for_each(|v| collect(v, &mut out));
        out
    }

    pub fn has_container_args(&self) -> bool {
        self.args.iter().any(|v| matches!(v, Value::Container(_)))
    }
}
