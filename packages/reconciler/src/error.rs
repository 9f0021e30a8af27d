use thiserror::Error;
use twig_common::HostError;
use twig_vdom::HookKind;

/// Errors that can occur during reconciliation
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("{hook} hook failed on <{tag}>: {source}")]
    Hook {
        hook: HookKind,
        tag: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl ReconcileError {
    pub(crate) fn hook(hook: HookKind, tag: &str, source: anyhow::Error) -> Self {
        ReconcileError::Hook {
            hook,
            tag: tag.to_string(),
            source: source.into(),
        }
    }

    pub fn is_hook_error(&self) -> bool {
        matches!(self, ReconcileError::Hook { .. })
    }
}

pub type ReconcileResult<T> = Result<T, ReconcileError>;
