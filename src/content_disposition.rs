use http::header;
use regex::Regex;

use crate::constants;
use crate::headers::Headers;

pub(crate) struct ContentDisposition {
    pub(crate) part_name: Option<String>,
    pub(crate) file_name: Option<String>,
}

impl ContentDisposition {
    pub fn parse(headers: &Headers) -> ContentDisposition {
        let content_disposition = headers.get(header::CONTENT_DISPOSITION);

        let part_name = content_disposition
            .and_then(|val| capture_param(&constants::CONTENT_DISPOSITION_PART_NAME_RE, val));

        let file_name = content_disposition
            .and_then(|val| capture_param(&constants::CONTENT_DISPOSITION_FILE_NAME_RE, val));

        ContentDisposition { part_name, file_name }
    }
}

/// Quoted values are unescaped, empty values count as missing.
fn capture_param(re: &Regex, val: &str) -> Option<String> {
    let cap = re.captures(val)?;

    let value = match (cap.get(1), cap.get(2)) {
        (Some(quoted), _) => constants::QUOTED_PAIR_RE.replace_all(quoted.as_str(), "$1").into_owned(),
        (None, Some(token)) => token.as_str().to_owned(),
        (None, None) => return None,
    };

    Some(value).filter(|value| !value.is_empty())
}
