//! Templated demo pages: `/greet` and `/calculator`
//!
//! Templates are plain HTML files with `{{key}}` placeholders, loaded
//! through the same file path as static content (and so through the open
//! file cache when it is enabled).

use crate::config::AppState;
use crate::handler::request::RequestContext;
use crate::handler::static_files;
use crate::http;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

pub const GREET_PATH: &str = "/greet";
pub const CALCULATOR_PATH: &str = "/calculator";

const GREET_TEMPLATE: &str = "greet_template.html";
const CALCULATOR_TEMPLATE: &str = "calculator_template.html";
const DEFAULT_NAME: &str = "Guest";
const DIVISION_BY_ZERO: &str = "Error: division by zero";

/// Greeting page, echoes `name` and every query parameter
pub async fn greet(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    let name = escape_html(ctx.params.get("name").unwrap_or(DEFAULT_NAME));
    let params_html: String = ctx
        .params
        .iter()
        .map(|(key, value)| {
            format!(
                "<li><strong>{}:</strong> {}</li>",
                escape_html(key),
                escape_html(value)
            )
        })
        .collect();

    render_page(
        state,
        GREET_TEMPLATE,
        &[("name", name), ("params", params_html)],
        ctx.is_head,
    )
    .await
}

/// Calculator page for `a`, `b` and `op`
pub async fn calculator(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    let a = ctx.params.get("a").unwrap_or("0");
    let b = ctx.params.get("b").unwrap_or("0");
    let op = ctx.params.get("op").unwrap_or("add");

    let calculation = match calculate(a, b, op) {
        Ok(calculation) => calculation,
        Err(e) => {
            logger::log_warning(&format!("Calculator rejected input: {e:?}"));
            return static_files::serve_error(state, 400, ctx.is_head).await;
        }
    };

    render_page(
        state,
        CALCULATOR_TEMPLATE,
        &[
            ("a", escape_html(a)),
            ("b", escape_html(b)),
            ("op_symbol", calculation.symbol.to_string()),
            ("result", escape_html(&calculation.result)),
        ],
        ctx.is_head,
    )
    .await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcError {
    InvalidOperand,
    UnknownOperation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calculation {
    pub symbol: &'static str,
    /// Formatted result, or the division by zero message
    pub result: String,
}

/// Evaluate `a <op> b`
///
/// Operands are checked before the operation. Division by zero is not an
/// error, it yields a message as the result.
#[allow(clippy::float_cmp)]
pub fn calculate(a: &str, b: &str, op: &str) -> Result<Calculation, CalcError> {
    let x: f64 = a.trim().parse().map_err(|_| CalcError::InvalidOperand)?;
    let y: f64 = b.trim().parse().map_err(|_| CalcError::InvalidOperand)?;

    let (symbol, value) = match op {
        "add" => ("+", Some(x + y)),
        "sub" => ("-", Some(x - y)),
        "mul" => ("×", Some(x * y)),
        "div" => ("÷", (y != 0.0).then_some(x / y)),
        _ => return Err(CalcError::UnknownOperation),
    };

    Ok(Calculation {
        symbol,
        result: value.map_or_else(|| DIVISION_BY_ZERO.to_string(), |v| v.to_string()),
    })
}

/// Replace each `{{key}}` in `template` with its value
pub fn render_template(template: &str, context: &[(&str, String)]) -> String {
    context
        .iter()
        .fold(template.to_string(), |content, (key, value)| {
            content.replace(&format!("{{{{{key}}}}}"), value)
        })
}

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

async fn render_page(
    state: &AppState,
    template_name: &str,
    context: &[(&str, String)],
    is_head: bool,
) -> Response<Full<Bytes>> {
    let template_path = state.template_dir.join(template_name);

    let template = match static_files::load_file(state, &template_path).await {
        Ok(file) => match String::from_utf8(file.data) {
            Ok(text) => text,
            Err(e) => {
                logger::log_error(&format!(
                    "Template '{}' is not valid UTF-8: {e}",
                    template_path.display()
                ));
                return static_files::serve_error(state, 500, is_head).await;
            }
        },
        Err(status) => {
            logger::log_error(&format!(
                "Failed to load template '{}' (status {status})",
                template_path.display()
            ));
            return static_files::serve_error(state, 500, is_head).await;
        }
    };

    http::build_html_response(
        render_template(&template, context),
        &state.config.http.server_name,
        is_head,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_operations() {
        assert_eq!(calculate("2", "3", "add").unwrap().result, "5");
        assert_eq!(calculate("2", "3", "sub").unwrap().result, "-1");
        assert_eq!(calculate("2.5", "4", "mul").unwrap().result, "10");
        assert_eq!(calculate("7", "2", "div").unwrap().result, "3.5");
        assert_eq!(calculate("7", "2", "div").unwrap().symbol, "÷");
    }

    #[test]
    fn test_division_by_zero_is_a_result() {
        let calc = calculate("1", "0", "div").unwrap();
        assert_eq!(calc.result, DIVISION_BY_ZERO);
    }

    #[test]
    fn test_calculate_rejects_bad_input() {
        assert_eq!(calculate("x", "1", "add"), Err(CalcError::InvalidOperand));
        assert_eq!(calculate("1", "", "add"), Err(CalcError::InvalidOperand));
        assert_eq!(calculate("1", "2", "pow"), Err(CalcError::UnknownOperation));
        // operands are validated before the operation
        assert_eq!(calculate("x", "2", "pow"), Err(CalcError::InvalidOperand));
    }

    #[test]
    fn test_render_template() {
        let out = render_template(
            "<h1>Hello, {{name}}!</h1><ul>{{params}}</ul>{{name}}",
            &[("name", "Ann".to_string()), ("params", String::new())],
        );
        assert_eq!(out, "<h1>Hello, Ann!</h1><ul></ul>Ann");
    }

    #[test]
    fn test_unknown_placeholders_left_alone() {
        let out = render_template("{{missing}}", &[("name", "x".to_string())]);
        assert_eq!(out, "{{missing}}");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<script>alert('x') & \"y\"</script>"),
            "&lt;script&gt;alert(&#x27;x&#x27;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
    }
}
