//! One-line CSV encoding of a [`Task`].
//!
//! Field order is fixed: `id,name,description,status,date,time,category,requiresAlarm`.
//! There is no header row. Fields containing a comma or a double quote are
//! wrapped in quotes with inner quotes doubled; every other field is written
//! verbatim. A line whose quoting is not well-formed is split on every comma,
//! so files written before quoting existed decode unchanged.

use tracing::trace;

use crate::fields::parse_status;
use crate::task::Task;

/// Number of fields in a record.
pub const FIELD_COUNT: usize = 8;

/// Encode a task as a single CSV line, without the trailing newline.
pub fn encode(task: &Task) -> String {
    let alarm = if task.requires_alarm { "true" } else { "false" };
    [
        task.id.as_str(),
        task.name.as_str(),
        task.description.as_str(),
        task.status.as_str(),
        task.date.as_str(),
        task.time.as_str(),
        task.category.as_str(),
        alarm,
    ]
    .iter()
    .map(|field| escape_field(field))
    .collect::<Vec<_>>()
    .join(",")
}

/// Decode one line into a task.
///
/// Returns `None` for blank lines, lines without a comma, and lines that do
/// not split into exactly [`FIELD_COUNT`] fields.
pub fn decode(line: &str) -> Option<Task> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.trim().is_empty() || !line.contains(',') {
        return None;
    }

    let fields = split_fields(line);
    if fields.len() != FIELD_COUNT {
        trace!(fields = fields.len(), "skipping record with wrong field count");
        return None;
    }

    let mut it = fields.into_iter();
    let mut next = || it.next().unwrap_or_default();
    let id = next();
    let name = next();
    let description = next();
    let status = parse_status(&next());
    let date = next();
    let time = next();
    let category = next();
    let requires_alarm = parse_bool(&next());

    Some(Task {
        id,
        name,
        description,
        status,
        date,
        time,
        category,
        requires_alarm,
    })
}

/// `"true"` in any case is true; everything else, padded values included, is false.
fn parse_bool(s: &str) -> bool {
    s.eq_ignore_ascii_case("true")
}

/// Quote a field if it contains a separator or a quote.
///
/// Records are one physical line each, so line breaks become spaces.
fn escape_field(s: &str) -> String {
    let s = if s.contains(['\r', '\n']) {
        s.replace("\r\n", " ").replace(['\r', '\n'], " ")
    } else {
        s.to_string()
    };
    if s.contains(',') || s.contains('"') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s
    }
}

/// Split a record into fields.
///
/// Quoted fields are honoured only when the whole line is well-formed
/// quoted CSV with [`FIELD_COUNT`] fields. Anything else is split on every
/// comma, which is how lines without quoting have always been read.
fn split_fields(line: &str) -> Vec<String> {
    split_quoted(line)
        .filter(|fields| fields.len() == FIELD_COUNT)
        .unwrap_or_else(|| line.split(',').map(str::to_string).collect())
}

/// Strict quoted split. A field opening with `"` must close with an
/// unescaped `"` right before a comma or the end of the line; otherwise
/// the line is not quoted CSV and `None` is returned.
fn split_quoted(line: &str) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        let mut current = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            loop {
                match chars.next()? {
                    '"' if chars.peek() == Some(&'"') => {
                        current.push('"');
                        chars.next();
                    }
                    '"' => break,
                    ch => current.push(ch),
                }
            }
            match chars.next() {
                None => {
                    fields.push(current);
                    return Some(fields);
                }
                Some(',') => fields.push(current),
                Some(_) => return None,
            }
        } else {
            loop {
                match chars.next() {
                    None => {
                        fields.push(current);
                        return Some(fields);
                    }
                    Some(',') => break,
                    Some(ch) => current.push(ch),
                }
            }
            fields.push(current);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Status;

    fn milk() -> Task {
        Task {
            id: "1".into(),
            name: "Buy milk".into(),
            description: "2L".into(),
            status: Status::Pendiente,
            date: "01/01/2025".into(),
            time: "09:00".into(),
            category: "Compras".into(),
            requires_alarm: false,
        }
    }

    #[test]
    fn encodes_plain_fields_verbatim() {
        assert_eq!(
            encode(&milk()),
            "1,Buy milk,2L,Pendiente,01/01/2025,09:00,Compras,false"
        );
    }

    #[test]
    fn round_trips_plain_task() {
        let task = milk();
        assert_eq!(decode(&encode(&task)), Some(task));
    }

    #[test]
    fn round_trips_fields_with_commas_and_quotes() {
        let task = Task {
            name: "Milk, eggs".into(),
            description: "the \"good\" ones".into(),
            category: "\"quoted\"".into(),
            requires_alarm: true,
            ..milk()
        };
        let line = encode(&task);
        assert_eq!(
            line,
            "1,\"Milk, eggs\",\"the \"\"good\"\" ones\",Pendiente,01/01/2025,09:00,\"\"\"quoted\"\"\",true"
        );
        assert_eq!(decode(&line), Some(task));
    }

    #[test]
    fn newlines_are_flattened() {
        let task = Task {
            description: "line one\r\nline two\nthree".into(),
            ..milk()
        };
        let line = encode(&task);
        assert!(!line.contains('\n'));
        assert_eq!(decode(&line).unwrap().description, "line one line two three");
    }

    #[test]
    fn decodes_legacy_lines() {
        let task = decode("abc,Name,Desc,Completada,05/01/2025,18:30,Casa,TRUE").unwrap();
        assert_eq!(task.id, "abc");
        assert_eq!(task.status, Status::Completada);
        assert!(task.requires_alarm);

        // a stray quote inside an unquoted field is literal
        let task = decode("x,5\" screen,Desc,Pendiente,d,t,c,false").unwrap();
        assert_eq!(task.name, "5\" screen");
    }

    #[test]
    fn unclosed_leading_quote_is_split_on_commas() {
        let task = decode("1,\"Big sale,desc,Pendiente,01/01/2025,09:00,Casa,false").unwrap();
        assert_eq!(task.id, "1");
        assert_eq!(task.name, "\"Big sale");
        assert_eq!(task.description, "desc");
        assert_eq!(task.category, "Casa");

        // re-encoding quotes the field, and it reads back the same
        assert_eq!(decode(&encode(&task)), Some(task));
    }

    #[test]
    fn quote_closed_mid_field_is_kept_verbatim() {
        let task = decode("2,\"Big\" sale,desc,Pendiente,01/01/2025,09:00,Casa,false").unwrap();
        assert_eq!(task.id, "2");
        assert_eq!(task.name, "\"Big\" sale");
        assert_eq!(decode(&encode(&task)), Some(task));
    }

    #[test]
    fn quoted_field_with_wrong_count_falls_back_to_plain_split() {
        // quoted reading gives 7 fields, a plain split gives 8
        let task = decode("3,\"a,b\",Pendiente,01/01/2025,09:00,Casa,false").unwrap();
        assert_eq!(task.name, "\"a");
        assert_eq!(task.description, "b\"");
    }

    #[test]
    fn tolerates_crlf() {
        let task = decode("1,Buy milk,2L,Pendiente,01/01/2025,09:00,Compras,false\r").unwrap();
        assert!(!task.requires_alarm);
        assert_eq!(task.category, "Compras");
    }

    #[test]
    fn anything_but_true_is_false() {
        for raw in ["false", "yes", "1", "", " true", "true "] {
            let line = format!("1,a,b,Pendiente,d,t,c,{raw}");
            assert!(!decode(&line).unwrap().requires_alarm, "{raw}");
        }
    }

    #[test]
    fn unknown_status_falls_back_to_pending() {
        let task = decode("1,a,b,En curso,d,t,c,false").unwrap();
        assert_eq!(task.status, Status::Pendiente);
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(decode(""), None);
        assert_eq!(decode("   "), None);
        assert_eq!(decode("no separator here"), None);
        assert_eq!(decode("1,too,few,fields"), None);
        assert_eq!(decode("1,a,b,Pendiente,d,t,c,false,extra"), None);
    }
}
