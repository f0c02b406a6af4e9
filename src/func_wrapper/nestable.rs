use std::sync::Arc;

use log::debug;

use super::invocation::{OutArg, Value};
use super::{Call, FunctionSpec, Middleware, make_call};
use crate::container::{Container, Leaf, MapOptions};
use crate::error::{ArrayError, CallError};

/// Layer 2: calls with container arguments run the rest of the pipeline once
/// per leaf and return a container of the same structure.
///
/// All container arguments must be congruent; other arguments are passed
/// unchanged to every leaf call. Sequences inside containers are mapped too.
pub(crate) struct NestableDispatch;

impl Middleware for NestableDispatch {
    fn wrap(&self, spec: Arc<FunctionSpec>, next: Call) -> Call {
        make_call(move |mut inv| {
            if !inv.has_container_args() {
                return next(inv);
            }
            let positions: Vec<usize> = inv
                .args
                .iter()
                .enumerate()
                .filter(|(_, v)| matches!(v, Value::Container(_)))
                .map(|(i, _)| i)
                .collect();
            let containers: Vec<&Container> = inv
                .args
                .iter()
                .filter_map(|v| match v {
                    Value::Container(c) => Some(c),
                    _ => None,
                })
                .collect();
            debug!("Mapping {} over {} container argument(s)", spec.name, containers.len());
            let options = MapOptions::new().map_sequences(true);
            let mapped = Container::multi_map(
                &containers,
                |leaves, _chain| -> Result<Leaf, CallError> {
                    let mut args = inv.args.clone();
                    for (&position, leaf) in positions.iter().zip(leaves) {
                        args[position] = Value::from((*leaf).clone());
                    }
                    Ok(Leaf::try_from(next(inv.detached(args))?)?)
                },
                &options,
            )?;
            match inv.out.take() {
                None => Ok(Value::Container(mapped)),
                Some(OutArg::Container(out)) => {
                    out.inplace_update(&mapped)?;
                    let written = out.map::<_, ArrayError>(|leaf, _| Ok(leaf.deep_copy()), &options)?;
                    Ok(Value::Container(written))
                }
                Some(OutArg::Array(_)) => Err(ArrayError::Value(format!(
                    "{} was called with container arguments but an array out buffer",
                    spec.name
                ))
                .into()),
            }
        })
    }
}
