//! Interactive value collection on a terminal.

use std::collections::HashMap;
use std::io::{self, BufRead, Write};

use command_args_core::{ArgValue, KindSpec, Parameter, Schema};

/// Prompts for every parameter of `schema` missing from `values`.
///
/// Blank answers leave the parameter unset, so value kinds are suppressed
/// and `choose` falls back to its default. A non-numeric answer to a `num`
/// prompt is asked again. Input ending early stops prompting.
pub fn collect_values<R: BufRead, W: Write>(
    schema: &Schema,
    values: &mut HashMap<String, ArgValue>,
    input: &mut R,
    output: &mut W,
) -> io::Result<()> {
    for parameter in schema.parameters() {
        if values.contains_key(&parameter.name) {
            continue;
        }
        let Some(kind) = parameter.spec.kind() else {
            continue;
        };

        loop {
            write!(output, "{}", label(parameter))?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(output)?;
                return Ok(());
            }
            let answer = line.trim_end_matches(['\r', '\n']);

            if answer.trim().is_empty() && kind.takes_value() {
                break;
            }
            match ArgValue::parse_for(kind, answer) {
                Some(value) => {
                    values.insert(parameter.name.clone(), value);
                    break;
                }
                None => writeln!(output, "'{answer}' is not a number, try again.")?,
            }
        }
    }
    Ok(())
}

fn label(parameter: &Parameter) -> String {
    let prompt = &parameter.prompt;
    match &parameter.spec {
        KindSpec::Bool { .. } | KindSpec::Str { .. } => format!("{prompt} (y/n): "),
        KindSpec::Choose {
            options, default, ..
        } if default.is_empty() => format!("{prompt} [{}]: ", options.join("/")),
        KindSpec::Choose {
            options, default, ..
        } => format!(
            "{prompt} [{}] (blank for {default}): ",
            options.join("/")
        ),
        KindSpec::Num { min, max, .. } => match (min, max) {
            (Some(min), Some(max)) => format!("{prompt} ({min}..{max}): "),
            (Some(min), None) => format!("{prompt} (>= {min}): "),
            (None, Some(max)) => format!("{prompt} (<= {max}): "),
            (None, None) => format!("{prompt}: "),
        },
        KindSpec::File { extensions, .. } if !extensions.is_empty() => {
            format!("{prompt} [{}]: ", extensions.join(", "))
        }
        _ => format!("{prompt}: "),
    }
}

/// Describes a parameter for listings: its kind and the metadata a form
/// would show.
pub fn describe(parameter: &Parameter) -> String {
    let Some(kind) = parameter.spec.kind() else {
        return format!("unsupported type '{}'", parameter.spec.tag());
    };
    match &parameter.spec {
        KindSpec::Choose {
            options, default, ..
        } => format!("{kind} [{}] default '{default}'", options.join(", ")),
        KindSpec::File {
            method, extensions, ..
        } => format!("{kind} ({method:?}) [{}]", extensions.join(", ")),
        KindSpec::Num { min, max, .. } => {
            let min = min.map_or("-".to_string(), |m| m.to_string());
            let max = max.map_or("-".to_string(), |m| m.to_string());
            format!("{kind} {min}..{max}")
        }
        _ => kind.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use command_args_core::FileMethod;

    use super::*;

    fn schema() -> Schema {
        Schema::new("g++")
            .with_parameter(
                Parameter::new("source", KindSpec::formatted("%s")).with_prompt("Source File"),
            )
            .with_parameter(Parameter::new(
                "std",
                KindSpec::choice(&["c++11", "c++17"], "c++11", "-std=%s"),
            ))
            .with_parameter(Parameter::new(
                "jobs",
                KindSpec::number("-j%d", Some(1.0), Some(4.0)),
            ))
            .with_parameter(Parameter::new("opt", KindSpec::literal("-O2")).with_prompt("O2"))
    }

    fn run(input: &str, values: &mut HashMap<String, ArgValue>) -> String {
        let mut reader = Cursor::new(input.as_bytes().to_vec());
        let mut out = Vec::new();
        collect_values(&schema(), values, &mut reader, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_collects_in_schema_order() {
        let mut values = HashMap::new();
        let transcript = run("main.cpp\nc++17\n3\ny\n", &mut values);

        assert_eq!(values["source"], ArgValue::from("main.cpp"));
        assert_eq!(values["std"], ArgValue::from("c++17"));
        assert_eq!(values["jobs"], ArgValue::Int(3));
        assert_eq!(values["opt"], ArgValue::Bool(true));
        assert!(transcript.starts_with("Source File: "));
        assert!(transcript.contains("std [c++11/c++17] (blank for c++11): "));
        assert!(transcript.contains("jobs (1..4): "));
        assert!(transcript.contains("O2 (y/n): "));
    }

    #[test]
    fn test_blank_answers_leave_values_unset() {
        let mut values = HashMap::new();
        run("\n\n\nn\n", &mut values);
        assert!(!values.contains_key("source"));
        assert!(!values.contains_key("std"));
        assert!(!values.contains_key("jobs"));
        assert_eq!(values["opt"], ArgValue::Bool(false));
    }

    #[test]
    fn test_reprompts_on_bad_number() {
        let mut values = HashMap::new();
        let transcript = run("a.cpp\n\nlots\n2\nn\n", &mut values);
        assert!(transcript.contains("'lots' is not a number, try again."));
        assert_eq!(values["jobs"], ArgValue::Int(2));
    }

    #[test]
    fn test_skips_preset_values_and_stops_at_eof() {
        let mut values = HashMap::from([("source".to_string(), ArgValue::from("x.cpp"))]);
        let transcript = run("c++11\n", &mut values);
        assert!(!transcript.contains("Source File"));
        assert_eq!(values["std"], ArgValue::from("c++11"));
        assert!(!values.contains_key("jobs"));
    }

    #[test]
    fn test_describe() {
        let file = Parameter::new("in", KindSpec::file("%s", FileMethod::Save, &["txt"]));
        assert_eq!(describe(&file), "file (Save) [txt]");
        let num = Parameter::new("n", KindSpec::number("%d", Some(0.0), None));
        assert_eq!(describe(&num), "num 0..-");
        let odd = Parameter::new(
            "m",
            KindSpec::Unsupported {
                kind: "matrix".into(),
            },
        );
        assert_eq!(describe(&odd), "unsupported type 'matrix'");
    }
}
