//! In-memory [`ManagedSdk`] for unit tests.

use crate::sdk::{ManagedSdk, ManagedSdkError, MessageListener, SdkInstaller};
use crate::{CancelToken, SdkComponent};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Probe {
    Installed,
    Component(SdkComponent),
    UpToDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Step {
    Core,
    Component(SdkComponent),
    Update,
}

type Hook = Box<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Inner {
    installed: AtomicBool,
    component: AtomicBool,
    current: AtomicBool,
    apply: AtomicBool,
    probes: Mutex<Vec<Probe>>,
    steps: Mutex<Vec<Step>>,
    probe_error: Mutex<Option<ManagedSdkError>>,
    step_errors: Mutex<HashMap<Step, ManagedSdkError>>,
    hooks: Mutex<HashMap<Step, Hook>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    running: AtomicUsize,
    max_running: AtomicUsize,
}

/// Records every probe and installer step; installers flip the matching flag
/// on success unless [`MockSdk::keep_state`] was called.
#[derive(Clone)]
pub(crate) struct MockSdk {
    inner: Arc<Inner>,
    root: PathBuf,
}

impl MockSdk {
    pub(crate) fn new(installed: bool, component: bool, current: bool) -> Self {
        let inner = Inner::default();
        inner.installed.store(installed, Ordering::SeqCst);
        inner.component.store(component, Ordering::SeqCst);
        inner.current.store(current, Ordering::SeqCst);
        inner.apply.store(true, Ordering::SeqCst);
        Self {
            inner: Arc::new(inner),
            root: PathBuf::from("/mock/managed/LATEST"),
        }
    }

    pub(crate) fn probes(&self) -> Vec<Probe> {
        self.inner.probes.lock().unwrap().clone()
    }

    pub(crate) fn steps(&self) -> Vec<Step> {
        self.inner.steps.lock().unwrap().clone()
    }

    pub(crate) fn max_running(&self) -> usize {
        self.inner.max_running.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_probe(&self, error: ManagedSdkError) {
        *self.inner.probe_error.lock().unwrap() = Some(error);
    }

    pub(crate) fn fail_step(&self, step: Step, error: ManagedSdkError) {
        self.inner.step_errors.lock().unwrap().insert(step, error);
    }

    pub(crate) fn clear_failures(&self) {
        self.inner.step_errors.lock().unwrap().clear();
    }

    /// Installers succeed without changing the probed state.
    pub(crate) fn keep_state(&self) {
        self.inner.apply.store(false, Ordering::SeqCst);
    }

    /// Run `hook` while `step` is executing.
    pub(crate) fn on_step(&self, step: Step, hook: impl Fn() + Send + Sync + 'static) {
        self.inner.hooks.lock().unwrap().insert(step, Box::new(hook));
    }

    /// Installer steps block until a permit is added to the returned semaphore.
    pub(crate) fn gate(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.inner.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    fn probe(&self, probe: Probe, flag: &AtomicBool) -> Result<bool, ManagedSdkError> {
        self.inner.probes.lock().unwrap().push(probe);
        if let Some(err) = self.inner.probe_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(flag.load(Ordering::SeqCst))
    }

    fn installer(&self, step: Step) -> Box<dyn SdkInstaller> {
        Box::new(MockInstaller {
            inner: self.inner.clone(),
            step,
        })
    }
}

impl ManagedSdk for MockSdk {
    fn root(&self) -> PathBuf {
        self.root.clone()
    }

    fn sdk_home(&self) -> PathBuf {
        self.root.join("google-cloud-sdk")
    }

    fn is_installed(&self) -> BoxFuture<'_, Result<bool, ManagedSdkError>> {
        let result = self.probe(Probe::Installed, &self.inner.installed);
        Box::pin(async move { result })
    }

    fn has_component(
        &self,
        component: SdkComponent,
    ) -> BoxFuture<'_, Result<bool, ManagedSdkError>> {
        let result = self.probe(Probe::Component(component), &self.inner.component);
        Box::pin(async move { result })
    }

    fn is_up_to_date(&self) -> BoxFuture<'_, Result<bool, ManagedSdkError>> {
        let result = self.probe(Probe::UpToDate, &self.inner.current);
        Box::pin(async move { result })
    }

    fn new_installer(&self) -> Result<Box<dyn SdkInstaller>, ManagedSdkError> {
        Ok(self.installer(Step::Core))
    }

    fn new_component_installer(
        &self,
        component: SdkComponent,
    ) -> Result<Box<dyn SdkInstaller>, ManagedSdkError> {
        Ok(self.installer(Step::Component(component)))
    }

    fn new_updater(&self) -> Result<Box<dyn SdkInstaller>, ManagedSdkError> {
        Ok(self.installer(Step::Update))
    }
}

struct MockInstaller {
    inner: Arc<Inner>,
    step: Step,
}

impl MockInstaller {
    async fn execute(&self, listener: &dyn MessageListener) -> Result<(), ManagedSdkError> {
        let inner = &self.inner;
        inner.steps.lock().unwrap().push(self.step);
        let now = inner.running.fetch_add(1, Ordering::SeqCst) + 1;
        inner.max_running.fetch_max(now, Ordering::SeqCst);
        listener.message(&format!("{:?}", self.step));

        if let Some(hook) = inner.hooks.lock().unwrap().get(&self.step) {
            hook();
        }
        let gate = inner.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        inner.running.fetch_sub(1, Ordering::SeqCst);

        if let Some(err) = inner.step_errors.lock().unwrap().get(&self.step).cloned() {
            return Err(err);
        }
        if inner.apply.load(Ordering::SeqCst) {
            let flag = match self.step {
                Step::Core => &inner.installed,
                Step::Component(_) => &inner.component,
                Step::Update => &inner.current,
            };
            flag.store(true, Ordering::SeqCst);
        }
        Ok(())
    }
}

impl SdkInstaller for MockInstaller {
    fn run<'a>(
        &'a self,
        listener: &'a dyn MessageListener,
        _cancel: &'a CancelToken,
    ) -> BoxFuture<'a, Result<(), ManagedSdkError>> {
        Box::pin(self.execute(listener))
    }
}
