//! Rendering of conditional expressions.

use brickyard_core::model::{Data, Expression, Operand, PortType, find_port};

use crate::error::{Error, Result};
use crate::interpolate;

/// Renders the `when` guard of the true branch.
///
/// Literals are rendered verbatim, data operands as input parameter
/// placeholders.
pub(crate) fn render_when(expression: &Expression, inputs: &[Data]) -> Result<String> {
    let left = when_operand(&expression.left, inputs)?;
    let right = when_operand(&expression.right, inputs)?;
    Ok(format!("{left} {} {right}", expression.operator))
}

/// Negates a `when` guard.
pub(crate) fn negate(when: &str) -> String {
    format!("!({when})")
}

/// Renders the expression in the orchestrator's expression syntax, for
/// output selection.
pub(crate) fn render_condition(expression: &Expression, inputs: &[Data]) -> Result<String> {
    let numeric = is_numeric(&expression.left) || is_numeric(&expression.right);
    let left = condition_operand(&expression.left, inputs, numeric)?;
    let right = condition_operand(&expression.right, inputs, numeric)?;
    Ok(format!("{left} {} {right}", expression.operator))
}

/// Selects between two expression references.
///
/// A missing false branch selects the empty string.
pub(crate) fn ternary(condition: &str, when_true: &str, when_false: Option<&str>) -> String {
    format!("{condition} ? {when_true} : {}", when_false.unwrap_or("''"))
}

fn when_operand(operand: &Operand, inputs: &[Data]) -> Result<String> {
    match operand {
        Operand::Literal { value } => Ok(value.clone()),
        Operand::Data(data) => {
            let port = comparable(data, inputs)?;
            Ok(interpolate::input_parameter(&port.name))
        }
    }
}

fn condition_operand(operand: &Operand, inputs: &[Data], numeric: bool) -> Result<String> {
    match operand {
        Operand::Literal { value } if is_number(value) => Ok(value.clone()),
        Operand::Literal { value } => Ok(interpolate::quote(value)),
        Operand::Data(data) => {
            let port = comparable(data, inputs)?;
            let reference = interpolate::input_parameter_expr(&port.name);
            if numeric {
                Ok(format!("asFloat({reference})"))
            } else {
                Ok(reference)
            }
        }
    }
}

/// Checks that a data operand names a scalar parameter input.
fn comparable<'a>(data: &Data, inputs: &'a [Data]) -> Result<&'a Data> {
    let port = find_port(inputs, &data.name).ok_or_else(|| Error::UnknownPort {
        direction: "input",
        port: data.name.clone(),
    })?;
    if port.kind != PortType::Parameter {
        return Err(Error::InvalidOperand {
            name: port.name.clone(),
            port_type: port.kind,
        });
    }
    Ok(port)
}

fn is_numeric(operand: &Operand) -> bool {
    matches!(operand, Operand::Literal { value } if is_number(value))
}

fn is_number(value: &str) -> bool {
    value.parse::<f64>().is_ok_and(f64::is_finite)
}
