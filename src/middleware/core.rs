use crate::handler::HandlerResponse;

/// Decision returned by a middleware
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Run the next middleware, then the handler
    Continue,
    /// Stop the dispatch; nothing further is produced
    Halt,
    /// Stop the dispatch and emit this response instead (e.g. a redirect)
    Respond(HandlerResponse),
}

impl Flow {
    /// True unless the chain must stop here
    #[must_use]
    pub fn is_continue(&self) -> bool {
        matches!(self, Flow::Continue)
    }
}

impl From<bool> for Flow {
    /// Only an explicit `false` halts.
    fn from(proceed: bool) -> Self {
        if proceed {
            Flow::Continue
        } else {
            Flow::Halt
        }
    }
}

impl From<()> for Flow {
    fn from(_: ()) -> Self {
        Flow::Continue
    }
}

impl From<HandlerResponse> for Flow {
    fn from(response: HandlerResponse) -> Self {
        Flow::Respond(response)
    }
}

/// A named pre-handler check
///
/// Middleware receives no arguments and cannot pass data to the handler or to
/// later middleware; it can only let the dispatch continue or stop it.
pub trait Middleware: Send + Sync {
    fn handle(&self) -> Flow;
}

impl<F, R> Middleware for F
where
    F: Fn() -> R + Send + Sync,
    R: Into<Flow>,
{
    fn handle(&self) -> Flow {
        self().into()
    }
}
