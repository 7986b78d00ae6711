//! Errors raised while invoking a matched route or reversing a named one.
//!
//! Route misses and middleware halts are reported through
//! [`Outcome`](crate::dispatcher::Outcome), not here.

use std::fmt;

/// Error returned by dispatch and reverse routing
///
/// Every variant except the reverse-routing ones is a configuration error:
/// the route table points at something that cannot be invoked. These are
/// propagated out of [`Dispatcher::dispatch`](crate::dispatcher::Dispatcher::dispatch)
/// so a misconfigured handler fails loudly instead of producing empty output.
///
/// Unregistered middleware names, middleware halts and unmatched paths are
/// not errors and never show up here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// A `"Name@action"` handler names a controller that was never registered
    UnknownController {
        /// The controller name as written in the handler reference
        controller: String,
    },
    /// The controller exists but does not answer to the requested action
    UnknownAction {
        /// The controller name
        controller: String,
        /// The action that was not found on it
        action: String,
    },
    /// A route's handler is a view template but no renderer was installed
    MissingViewRenderer {
        /// The template the route asked for
        template: String,
    },
    /// The view renderer failed for the given template
    ViewRender {
        /// The template being rendered
        template: String,
        /// Renderer error message
        message: String,
    },
    /// `url_for` was called with a name that no route carries
    UnknownRouteName {
        /// The requested route name
        name: String,
    },
    /// `url_for` was not given a value for one of the route's placeholders
    MissingRouteParameter {
        /// The route name
        name: String,
        /// The placeholder that had no value
        parameter: String,
    },
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::UnknownController { controller } => {
                write!(f, "Controller {controller} not found")
            }
            RouterError::UnknownAction { controller, action } => {
                write!(f, "Method {action} not found in {controller}")
            }
            RouterError::MissingViewRenderer { template } => {
                write!(
                    f,
                    "Route handler is the view '{template}' but no view renderer is installed"
                )
            }
            RouterError::ViewRender { template, message } => {
                write!(f, "Failed to render view '{template}': {message}")
            }
            RouterError::UnknownRouteName { name } => {
                write!(f, "No route is named '{name}'")
            }
            RouterError::MissingRouteParameter { name, parameter } => {
                write!(
                    f,
                    "Route '{name}' requires a value for '{{{parameter}}}'"
                )
            }
        }
    }
}

impl std::error::Error for RouterError {}

impl RouterError {
    /// True for errors caused by an unresolvable route handler
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        !matches!(
            self,
            RouterError::UnknownRouteName { .. } | RouterError::MissingRouteParameter { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = RouterError::UnknownAction {
            controller: "UserController".to_string(),
            action: "show".to_string(),
        };
        assert_eq!(err.to_string(), "Method show not found in UserController");

        let err = RouterError::MissingRouteParameter {
            name: "users.show".to_string(),
            parameter: "id".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Route 'users.show' requires a value for '{id}'"
        );
    }

    #[test]
    fn test_configuration_classification() {
        assert!(RouterError::UnknownController {
            controller: "X".to_string()
        }
        .is_configuration_error());
        assert!(!RouterError::UnknownRouteName {
            name: "x".to_string()
        }
        .is_configuration_error());
    }
}
