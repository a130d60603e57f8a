use crate::config::ConvergeConfig;
use crate::error::{DeployError, Result};
use crate::provider::StackProvider;
use crate::types::{OutputRecord, StackDescriptor};
use std::time::Duration;
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Converger
// ---------------------------------------------------------------------------

/// Reconciliation engine: drives a named stack to a terminal success state.
///
/// Owns no persistent state — it is a pure function over remote status plus
/// local retry bookkeeping, which is what makes re-running a pipeline after
/// an interruption safe: an already-converged stack takes the fast path and
/// an in-flight one is simply re-polled.
pub struct Converger<'a> {
    provider: &'a dyn StackProvider,
    poll_interval: Duration,
    max_polls: u32,
}

impl<'a> Converger<'a> {
    pub fn new(provider: &'a dyn StackProvider, config: &ConvergeConfig) -> Self {
        Self {
            provider,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            max_polls: config.max_polls,
        }
    }

    /// Bring the described stack to a terminal success state and return its
    /// outputs.
    ///
    /// - already complete: return outputs immediately, no creation request
    /// - in progress: poll without issuing a new create
    /// - any other status: fail fast with the reported status string
    /// - absent: submit a create, then poll
    pub fn ensure_converged(&self, descriptor: &StackDescriptor) -> Result<Vec<OutputRecord>> {
        let name = &descriptor.name;

        match self.provider.describe(name) {
            Ok(view) if view.status.is_complete() => {
                info!(stack = %name, status = %view.status, "stack already converged");
                return Ok(view.outputs);
            }
            Ok(view) if view.status.is_in_progress() => {
                info!(stack = %name, status = %view.status, "stack already converging, waiting");
                self.poll_until_complete(name)?;
            }
            Ok(view) => {
                return Err(DeployError::StackFailed {
                    name: name.clone(),
                    status: view.status.as_str().to_string(),
                });
            }
            Err(DeployError::StackNotFound(_)) => {
                let template_body = read_template(descriptor)?;
                let handle = self
                    .provider
                    .create(name, &template_body, &descriptor.parameters)?;
                info!(stack = %name, handle = %handle, "started stack deployment");
                self.poll_until_complete(name)?;
            }
            Err(e) => return Err(e),
        }

        self.provider.outputs(name)
    }

    /// Re-describe until the stack leaves its in-progress state, bounded by
    /// `max_polls`. A non-success terminal status fails immediately.
    fn poll_until_complete(&self, name: &str) -> Result<()> {
        for poll in 1..=self.max_polls {
            let view = self.provider.describe(name)?;
            if view.status.is_complete() {
                info!(stack = %name, status = %view.status, "stack deployment complete");
                return Ok(());
            }
            if !view.status.is_in_progress() {
                return Err(DeployError::StackFailed {
                    name: name.to_string(),
                    status: view.status.as_str().to_string(),
                });
            }
            debug!(stack = %name, status = %view.status, poll, "still converging");
            std::thread::sleep(self.poll_interval);
        }
        Err(DeployError::ConvergeTimeout {
            name: name.to_string(),
            polls: self.max_polls,
        })
    }
}

fn read_template(descriptor: &StackDescriptor) -> Result<String> {
    if !descriptor.template_path.exists() {
        return Err(DeployError::TemplateNotFound(
            descriptor.template_path.clone(),
        ));
    }
    Ok(std::fs::read_to_string(&descriptor.template_path)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{StackHandle, StackStatus, StackView};
    use std::cell::{Cell, RefCell};
    use tempfile::TempDir;

    /// Scripted provider: each describe consumes the next entry; the last
    /// entry repeats once the script is exhausted.
    struct FakeProvider {
        script: RefCell<Vec<Option<StackStatus>>>,
        cursor: Cell<usize>,
        outputs: Vec<OutputRecord>,
        create_calls: Cell<u32>,
    }

    impl FakeProvider {
        fn new(script: Vec<Option<StackStatus>>) -> Self {
            Self {
                script: RefCell::new(script),
                cursor: Cell::new(0),
                outputs: vec![OutputRecord::new("ClusterName", "c1")],
                create_calls: Cell::new(0),
            }
        }

        fn with_outputs(mut self, outputs: Vec<OutputRecord>) -> Self {
            self.outputs = outputs;
            self
        }
    }

    impl StackProvider for FakeProvider {
        fn describe(&self, name: &str) -> Result<StackView> {
            let script = self.script.borrow();
            let idx = self.cursor.get().min(script.len() - 1);
            self.cursor.set(self.cursor.get() + 1);
            match &script[idx] {
                None => Err(DeployError::StackNotFound(name.to_string())),
                Some(status) => Ok(StackView {
                    name: name.to_string(),
                    status: status.clone(),
                    outputs: self.outputs.clone(),
                }),
            }
        }

        fn create(
            &self,
            name: &str,
            _template_body: &str,
            _parameters: &[(String, String)],
        ) -> Result<StackHandle> {
            self.create_calls.set(self.create_calls.get() + 1);
            Ok(StackHandle(format!("stack/{name}/fake")))
        }

        fn outputs(&self, _name: &str) -> Result<Vec<OutputRecord>> {
            Ok(self.outputs.clone())
        }
    }

    fn fast_config() -> ConvergeConfig {
        ConvergeConfig {
            poll_interval_secs: 0,
            max_polls: 10,
        }
    }

    fn descriptor(dir: &TempDir) -> StackDescriptor {
        let template = dir.path().join("network.yaml");
        std::fs::write(&template, "Resources: {}").unwrap();
        StackDescriptor::new("ms-network", template)
    }

    #[test]
    fn fast_path_returns_outputs_without_create() {
        let dir = TempDir::new().unwrap();
        let provider = FakeProvider::new(vec![Some(StackStatus::CreateComplete)]);

        let outputs = Converger::new(&provider, &fast_config())
            .ensure_converged(&descriptor(&dir))
            .unwrap();

        assert_eq!(outputs, vec![OutputRecord::new("ClusterName", "c1")]);
        assert_eq!(provider.create_calls.get(), 0);
    }

    #[test]
    fn repeated_convergence_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let provider = FakeProvider::new(vec![Some(StackStatus::UpdateComplete)]);
        let converger = Converger::new(&provider, &fast_config());
        let desc = descriptor(&dir);

        let first = converger.ensure_converged(&desc).unwrap();
        let second = converger.ensure_converged(&desc).unwrap();

        assert_eq!(first, second);
        assert_eq!(provider.create_calls.get(), 0);
    }

    #[test]
    fn absent_stack_is_created_then_polled() {
        let dir = TempDir::new().unwrap();
        let provider = FakeProvider::new(vec![
            None,
            Some(StackStatus::CreateInProgress),
            Some(StackStatus::CreateInProgress),
            Some(StackStatus::CreateComplete),
        ]);

        let outputs = Converger::new(&provider, &fast_config())
            .ensure_converged(&descriptor(&dir))
            .unwrap();

        assert_eq!(provider.create_calls.get(), 1);
        assert_eq!(outputs.len(), 1);
    }

    #[test]
    fn in_progress_stack_is_polled_without_create() {
        let dir = TempDir::new().unwrap();
        let provider = FakeProvider::new(vec![
            Some(StackStatus::UpdateInProgress),
            Some(StackStatus::UpdateInProgress),
            Some(StackStatus::UpdateComplete),
        ]);

        Converger::new(&provider, &fast_config())
            .ensure_converged(&descriptor(&dir))
            .unwrap();

        assert_eq!(provider.create_calls.get(), 0);
    }

    #[test]
    fn unexpected_status_fails_fast() {
        let dir = TempDir::new().unwrap();
        let provider = FakeProvider::new(vec![Some(StackStatus::Other(
            "ROLLBACK_COMPLETE".to_string(),
        ))]);

        match Converger::new(&provider, &fast_config()).ensure_converged(&descriptor(&dir)) {
            Err(DeployError::StackFailed { name, status }) => {
                assert_eq!(name, "ms-network");
                assert_eq!(status, "ROLLBACK_COMPLETE");
            }
            other => panic!("expected StackFailed, got {other:?}"),
        }
        assert_eq!(provider.create_calls.get(), 0);
    }

    #[test]
    fn failure_during_poll_carries_status() {
        let dir = TempDir::new().unwrap();
        let provider = FakeProvider::new(vec![
            None,
            Some(StackStatus::CreateInProgress),
            Some(StackStatus::Other("ROLLBACK_IN_PROGRESS".to_string())),
        ]);

        match Converger::new(&provider, &fast_config()).ensure_converged(&descriptor(&dir)) {
            Err(DeployError::StackFailed { status, .. }) => {
                assert_eq!(status, "ROLLBACK_IN_PROGRESS");
            }
            other => panic!("expected StackFailed, got {other:?}"),
        }
    }

    #[test]
    fn perpetual_in_progress_times_out() {
        let dir = TempDir::new().unwrap();
        let provider = FakeProvider::new(vec![Some(StackStatus::CreateInProgress)]);
        let config = ConvergeConfig {
            poll_interval_secs: 0,
            max_polls: 5,
        };

        match Converger::new(&provider, &config).ensure_converged(&descriptor(&dir)) {
            Err(DeployError::ConvergeTimeout { name, polls }) => {
                assert_eq!(name, "ms-network");
                assert_eq!(polls, 5);
            }
            other => panic!("expected ConvergeTimeout, got {other:?}"),
        }
    }

    #[test]
    fn missing_template_fails_before_create() {
        let provider = FakeProvider::new(vec![None]);
        let desc = StackDescriptor::new("ms-network", "/nonexistent/network.yaml");

        match Converger::new(&provider, &fast_config()).ensure_converged(&desc) {
            Err(DeployError::TemplateNotFound(_)) => {}
            other => panic!("expected TemplateNotFound, got {other:?}"),
        }
        assert_eq!(provider.create_calls.get(), 0);
    }

    #[test]
    fn empty_outputs_are_allowed() {
        let dir = TempDir::new().unwrap();
        let provider =
            FakeProvider::new(vec![Some(StackStatus::CreateComplete)]).with_outputs(Vec::new());

        let outputs = Converger::new(&provider, &fast_config())
            .ensure_converged(&descriptor(&dir))
            .unwrap();
        assert!(outputs.is_empty());
    }
}
