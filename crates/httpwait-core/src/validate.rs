use serde_json::Value;

use crate::error::AttemptFailure;
use crate::extract::{extract, render};
use crate::request::Expectation;
use crate::transport::HttpResponse;

/// Check one response against `expectation`, stopping at the first unmet
/// condition: status, then JSON body, then field presence, then value.
pub fn validate(response: &HttpResponse, expectation: &Expectation) -> Result<(), AttemptFailure> {
    if response.status != expectation.status() {
        return Err(AttemptFailure::StatusMismatch {
            got: response.status,
            want: expectation.status(),
        });
    }

    let Some(path) = expectation.field() else {
        return Ok(());
    };

    let document: Value =
        serde_json::from_slice(&response.body).map_err(|e| AttemptFailure::BodyNotJson {
            reason: e.to_string(),
        })?;

    let Some(value) = extract(&document, path) else {
        return Err(AttemptFailure::FieldMissing { path: path.clone() });
    };

    let Some(want) = expectation.value() else {
        return Ok(());
    };

    let got = render(value);
    if got != want {
        return Err(AttemptFailure::FieldValueMismatch {
            path: path.clone(),
            got: got.into_owned(),
            want: want.to_string(),
        });
    }

    Ok(())
}
