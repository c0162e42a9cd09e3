use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;

/// An unexpected failure: a bug, a broken collaborator, or a panic.
///
/// Defects are not part of any handler's declared failure type. They travel on their
/// own channel and are only ever turned into a generic `500` at the sandbox boundary;
/// their detail is logged server side and never sent to the caller.
pub struct Defect {
    kind: DefectKind,
}

enum DefectKind {
    Error(anyhow::Error),
    Panic(String),
}

impl Defect {
    /// Wrap any error as a defect
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Self {
            kind: DefectKind::Error(error.into()),
        }
    }

    /// Create a defect from a plain message
    pub fn msg(message: impl fmt::Display + fmt::Debug + Send + Sync + 'static) -> Self {
        Self::new(anyhow::Error::msg(message))
    }

    /// Convert a panic payload captured by `catch_unwind`
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Box<dyn Any>".to_owned()
        };
        Self {
            kind: DefectKind::Panic(message),
        }
    }

    /// Whether this defect was captured from a panic
    #[must_use]
    pub fn is_panic(&self) -> bool {
        matches!(self.kind, DefectKind::Panic(_))
    }
}

impl From<anyhow::Error> for Defect {
    fn from(error: anyhow::Error) -> Self {
        Self::new(error)
    }
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DefectKind::Error(e) => write!(f, "{e:#}"),
            DefectKind::Panic(message) => write!(f, "panicked: {message}"),
        }
    }
}

impl fmt::Debug for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DefectKind::Error(e) => write!(f, "Defect({e:?})"),
            DefectKind::Panic(message) => write!(f, "Defect(panic: {message:?})"),
        }
    }
}

/// Why a computation failed: a declared, typed failure or a defect.
#[derive(Debug)]
pub enum Cause<E> {
    /// Expected failure of type `E`, meant to be handled by an enclosing layer
    Fail(E),
    /// Unexpected failure
    Die(Defect),
}

impl<E> Cause<E> {
    /// Transform the typed failure, leaving defects untouched
    pub fn map_fail<E2>(self, f: impl FnOnce(E) -> E2) -> Cause<E2> {
        match self {
            Cause::Fail(e) => Cause::Fail(f(e)),
            Cause::Die(d) => Cause::Die(d),
        }
    }

    /// The typed failure, if this is one
    pub fn failure(&self) -> Option<&E> {
        match self {
            Cause::Fail(e) => Some(e),
            Cause::Die(_) => None,
        }
    }

    /// The defect, if this is one
    pub fn defect(&self) -> Option<&Defect> {
        match self {
            Cause::Fail(_) => None,
            Cause::Die(d) => Some(d),
        }
    }
}

impl<E> From<Defect> for Cause<E> {
    fn from(defect: Defect) -> Self {
        Cause::Die(defect)
    }
}

impl<E: fmt::Display> fmt::Display for Cause<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::Fail(e) => write!(f, "Fail({e})"),
            Cause::Die(d) => write!(f, "Die({d})"),
        }
    }
}

/// Run `fut`, converting a panic anywhere inside it into `Cause::Die`.
///
/// Typed failures and returned defects pass through unchanged, so the caller sees every
/// way the computation can end as one `Result`.
pub async fn sandbox<A, E, F>(fut: F) -> Result<A, Cause<E>>
where
    F: Future<Output = Result<A, Cause<E>>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(Cause::Die(Defect::from_panic(payload))),
    }
}

/// Narrow a computation's typed failure.
///
/// `handler` runs only for `Cause::Fail` and may recover with a value, re-fail with a
/// new failure type, or die. Defects bypass it.
pub async fn recover<A, E, E2, F, H, HF>(fut: F, handler: H) -> Result<A, Cause<E2>>
where
    F: Future<Output = Result<A, Cause<E>>>,
    H: FnOnce(E) -> HF,
    HF: Future<Output = Result<A, Cause<E2>>>,
{
    match fut.await {
        Ok(value) => Ok(value),
        Err(Cause::Fail(e)) => handler(e).await,
        Err(Cause::Die(d)) => Err(Cause::Die(d)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn explode() -> Result<(), Cause<Infallible>> {
        panic!("handler exploded")
    }

    #[tokio::test]
    async fn test_sandbox_captures_panic() {
        let result = sandbox(async { explode() }).await;
        let defect = result.unwrap_err();
        let defect = defect.defect().unwrap();
        assert!(defect.is_panic());
        assert_eq!(defect.to_string(), "panicked: handler exploded");
    }

    #[tokio::test]
    async fn test_sandbox_passes_results_through() {
        let ok: Result<u8, Cause<&str>> = sandbox(async { Ok(1) }).await;
        assert_eq!(ok.unwrap(), 1);

        let failed: Result<u8, Cause<&str>> = sandbox(async { Err(Cause::Fail("nope")) }).await;
        assert_eq!(failed.unwrap_err().failure(), Some(&"nope"));
    }

    #[tokio::test]
    async fn test_recover_only_sees_typed_failures() {
        let recovered: Result<u8, Cause<Infallible>> =
            recover(async { Err(Cause::Fail("missing")) }, |_e: &str| async { Ok(7) }).await;
        assert_eq!(recovered.unwrap(), 7);

        let died: Result<u8, Cause<Infallible>> = recover(
            async { Err::<u8, Cause<&str>>(Cause::Die(Defect::msg("broken"))) },
            |_e| async { Ok(7) },
        )
        .await;
        assert_eq!(died.unwrap_err().defect().unwrap().to_string(), "broken");
    }

    #[test]
    fn test_defect_display_includes_context_chain() {
        let err = anyhow::anyhow!("disk full").context("writing record");
        let defect = Defect::from(err);
        assert_eq!(defect.to_string(), "writing record: disk full");
        assert!(!defect.is_panic());
    }
}
