use crate::document::WorkoutDocument;
use serde_json::Value;
use std::time::Duration;

/// Environment variable that overrides any configured token.
pub const TOKEN_ENV: &str = "PLAN_TO_WORKOUT_TOKEN";
const TOKEN_HEADER: &str = "connect-csrf-token";

/// Determine the token to submit with.
///
/// An explicit value (for example from the command line) wins, then the
/// `PLAN_TO_WORKOUT_TOKEN` environment variable, then the settings file.
/// Blank values are ignored.
pub fn resolve_token(explicit: Option<&str>, settings_token: Option<&str>) -> Option<String> {
    let non_blank = |s: &str| {
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_string())
    };
    explicit
        .and_then(non_blank)
        .or_else(|| std::env::var(TOKEN_ENV).ok().as_deref().and_then(non_blank))
        .or_else(|| settings_token.and_then(non_blank))
}

#[derive(Debug)]
pub enum SubmitError {
    MissingToken,
    Unauthorized(String),
    Forbidden(String),
    Status(u16, String),
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitError::MissingToken => write!(f, "no CSRF token available, nothing submitted"),
            SubmitError::Unauthorized(body) => write!(f, "Unauthorized: {body}"),
            SubmitError::Forbidden(body) => write!(f, "Forbidden: {body}"),
            SubmitError::Status(code, body) => write!(f, "HTTP {code}: {body}"),
            SubmitError::Other(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SubmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SubmitError::Other(e) => Some(&**e),
            _ => None,
        }
    }
}

/// Something that accepts one finished workout at a time.
pub trait Submitter {
    fn submit(&self, document: &WorkoutDocument) -> Result<Value, SubmitError>;
}

/// Posts workouts to the workout service.
pub struct WorkoutClient {
    url: String,
    token: String,
    agent: ureq::Agent,
}

impl WorkoutClient {
    /// Fails with [`SubmitError::MissingToken`] when no token is available.
    pub fn new(url: &str, token: Option<String>) -> Result<Self, SubmitError> {
        let token = token
            .filter(|t| !t.trim().is_empty())
            .ok_or(SubmitError::MissingToken)?;
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(30))
            .build();
        Ok(Self {
            url: url.to_string(),
            token,
            agent,
        })
    }
}

impl Submitter for WorkoutClient {
    fn submit(&self, document: &WorkoutDocument) -> Result<Value, SubmitError> {
        let payload =
            serde_json::to_value(document).map_err(|e| SubmitError::Other(Box::new(e)))?;
        let response = self
            .agent
            .post(&self.url)
            .set(TOKEN_HEADER, &self.token)
            .set("Accept", "application/json")
            .send_json(payload);
        let body = match response {
            Ok(r) => r.into_string().map_err(|e| SubmitError::Other(Box::new(e)))?,
            Err(ureq::Error::Status(401, r)) => {
                let body = r.into_string().unwrap_or_default();
                return Err(SubmitError::Unauthorized(body));
            }
            Err(ureq::Error::Status(403, r)) => {
                let body = r.into_string().unwrap_or_default();
                return Err(SubmitError::Forbidden(body));
            }
            Err(ureq::Error::Status(code, r)) => {
                let body = r.into_string().unwrap_or_default();
                return Err(SubmitError::Status(code, body));
            }
            Err(e) => return Err(SubmitError::Other(Box::new(e))),
        };
        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }
}

/// What happened to one document.
#[derive(Debug)]
pub struct Disposition {
    pub row: usize,
    pub name: String,
    pub result: Result<Value, SubmitError>,
}

/// Submit documents one at a time, in order, waiting `spacing` between
/// calls. A failed submission is recorded and the next document still goes
/// out.
pub fn submit_all<S: Submitter + ?Sized>(
    submitter: &S,
    documents: &[(usize, WorkoutDocument)],
    spacing: Duration,
) -> Vec<Disposition> {
    let mut dispositions = Vec::with_capacity(documents.len());
    for (i, (row, doc)) in documents.iter().enumerate() {
        if i > 0 && !spacing.is_zero() {
            std::thread::sleep(spacing);
        }
        let result = submitter.submit(doc);
        match &result {
            Ok(body) => match body.get("workoutId") {
                Some(id) => log::info!("Row {row}: created \"{}\" as workout {id}", doc.name),
                None => log::info!("Row {row}: submitted \"{}\"", doc.name),
            },
            Err(e) => log::error!("Row {row}: failed to submit \"{}\": {e}", doc.name),
        }
        dispositions.push(Disposition {
            row: *row,
            name: doc.name.clone(),
            result,
        });
    }
    dispositions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{ConvertOptions, convert_text};
    use crate::settings::tests::ENV_MUTEX;
    use httpmock::prelude::*;
    use std::cell::RefCell;
    use std::time::Instant;

    fn documents(text: &str) -> Vec<(usize, WorkoutDocument)> {
        convert_text(text, &ConvertOptions::default())
            .unwrap()
            .documents
    }

    #[test]
    fn posts_document_with_token_header() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/workout")
                .header("connect-csrf-token", "tok")
                .json_body_partial(r#"{"workoutName": "MorningRun", "estimatedDurationInSecs": 1800}"#);
            then.status(200).body(r#"{"workoutId": 42}"#);
        });

        let client = WorkoutClient::new(&server.url("/workout"), Some("tok".into())).unwrap();
        let docs = documents("MorningRun,1,300,300,Zone5,1200,0,0");
        let body = client.submit(&docs[0].1).unwrap();
        assert_eq!(body["workoutId"], 42);

        m.assert();
    }

    #[test]
    fn maps_403_to_forbidden() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST).path("/workout");
            then.status(403).body("forbidden body");
        });

        let client = WorkoutClient::new(&server.url("/workout"), Some("tok".into())).unwrap();
        let docs = documents("A,0,60,0");
        match client.submit(&docs[0].1).unwrap_err() {
            SubmitError::Forbidden(body) => assert_eq!(body, "forbidden body"),
            e => panic!("unexpected error: {e:?}"),
        }

        m.assert();
    }

    #[test]
    fn maps_401_and_other_statuses() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/unauthorized");
            then.status(401).body("login first");
        });
        server.mock(|when, then| {
            when.method(POST).path("/broken");
            then.status(500).body("oops");
        });

        let docs = documents("A,0,60,0");
        let client = WorkoutClient::new(&server.url("/unauthorized"), Some("t".into())).unwrap();
        assert!(matches!(
            client.submit(&docs[0].1),
            Err(SubmitError::Unauthorized(body)) if body == "login first"
        ));
        let client = WorkoutClient::new(&server.url("/broken"), Some("t".into())).unwrap();
        assert!(matches!(
            client.submit(&docs[0].1),
            Err(SubmitError::Status(500, body)) if body == "oops"
        ));
    }

    #[test]
    fn missing_token_prevents_client() {
        assert!(matches!(
            WorkoutClient::new("http://localhost/workout", None),
            Err(SubmitError::MissingToken)
        ));
        assert!(matches!(
            WorkoutClient::new("http://localhost/workout", Some("  ".into())),
            Err(SubmitError::MissingToken)
        ));
    }

    #[test]
    fn token_precedence() {
        let _guard = ENV_MUTEX.lock().unwrap();
        unsafe {
            std::env::remove_var(TOKEN_ENV);
        }
        assert_eq!(resolve_token(None, Some("settings")).as_deref(), Some("settings"));
        assert_eq!(resolve_token(Some(" "), None), None);

        unsafe {
            std::env::set_var(TOKEN_ENV, "from-env");
        }
        assert_eq!(resolve_token(None, Some("settings")).as_deref(), Some("from-env"));
        assert_eq!(resolve_token(Some("flag"), Some("settings")).as_deref(), Some("flag"));
        unsafe {
            std::env::remove_var(TOKEN_ENV);
        }
    }

    struct FailSecond {
        seen: RefCell<Vec<String>>,
    }

    impl Submitter for FailSecond {
        fn submit(&self, document: &WorkoutDocument) -> Result<Value, SubmitError> {
            self.seen.borrow_mut().push(document.name.clone());
            if self.seen.borrow().len() == 2 {
                Err(SubmitError::Status(500, "boom".into()))
            } else {
                Ok(serde_json::json!({"workoutId": self.seen.borrow().len()}))
            }
        }
    }

    #[test]
    fn failure_does_not_block_later_rows() {
        let docs = documents("A,0,60,0\nB,0,60,0\nC,0,60,0");
        let submitter = FailSecond {
            seen: RefCell::new(Vec::new()),
        };
        let started = Instant::now();
        let results = submit_all(&submitter, &docs, Duration::from_millis(20));
        assert!(started.elapsed() >= Duration::from_millis(40));

        assert_eq!(*submitter.seen.borrow(), vec!["A", "B", "C"]);
        assert_eq!(results.len(), 3);
        assert!(results[0].result.is_ok());
        assert!(results[1].result.is_err());
        assert_eq!(results[2].row, 3);
        assert!(results[2].result.is_ok());
    }
}
