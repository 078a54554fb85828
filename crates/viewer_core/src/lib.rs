//! Session core for the remote viewer control client.
//!
//! A [`ViewerSession`] owns one channel to the rendering backend, the
//! throttled key-input path, the shared step magnitude, and one view
//! state per viewer slot. The rendering boundary consumes snapshots and
//! subscribes to [`ViewerEvent`]s; it never mutates session state.

use std::{collections::HashMap, sync::Arc};

use anyhow::{Context, Result};
use tokio::{
    sync::{broadcast, mpsc, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info};

use shared::{
    domain::{ModelRef, ViewerSlot},
    protocol::{BackendEvent, ClientCommand, ImageData, UserData},
};

pub mod channel;
pub mod step;
pub mod throttle;
pub mod view;

pub use channel::{ChannelError, ChannelSession, ChannelStatus};
pub use step::StepController;
pub use throttle::InputThrottler;
pub use view::{Telemetry, ViewState};

/// Who this session is, fixed at construction from navigation state.
/// One model ref in single mode, two (left then right) in dual mode.
#[derive(Debug, Clone)]
pub struct SessionIdentity {
    pub user_name: String,
    pub model_refs: Vec<ModelRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerMode {
    Single,
    Dual,
}

/// Notifications for the rendering boundary.
#[derive(Debug, Clone)]
pub enum ViewerEvent {
    ConnectionChanged(ChannelStatus),
    /// The slot's image payloads or generation marker changed; re-read
    /// its snapshot.
    ViewUpdated { slot: ViewerSlot },
    StepChanged { value: u8, boundary_message: String },
    TelemetryUpdated { elevation: f64, heading: f64 },
}

pub struct ViewerSession {
    identity: SessionIdentity,
    mode: ViewerMode,
    channel: ChannelSession,
    inner: Mutex<SessionState>,
    events: broadcast::Sender<ViewerEvent>,
}

struct SessionState {
    views: HashMap<ViewerSlot, ViewState>,
    step: StepController,
    throttle: InputThrottler,
    telemetry: Telemetry,
    dispatch_task: Option<JoinHandle<()>>,
}

impl ViewerSession {
    pub fn single(user_name: impl Into<String>, model: ModelRef) -> Arc<Self> {
        Self::new(
            SessionIdentity {
                user_name: user_name.into(),
                model_refs: vec![model],
            },
            ViewerMode::Single,
        )
    }

    pub fn dual(user_name: impl Into<String>, left: ModelRef, right: ModelRef) -> Arc<Self> {
        Self::new(
            SessionIdentity {
                user_name: user_name.into(),
                model_refs: vec![left, right],
            },
            ViewerMode::Dual,
        )
    }

    fn new(identity: SessionIdentity, mode: ViewerMode) -> Arc<Self> {
        let views = match mode {
            ViewerMode::Single => HashMap::from([(ViewerSlot::Main, ViewState::new())]),
            ViewerMode::Dual => HashMap::from([
                (ViewerSlot::Left, ViewState::new()),
                (ViewerSlot::Right, ViewState::new()),
            ]),
        };
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            identity,
            mode,
            channel: ChannelSession::new(),
            inner: Mutex::new(SessionState {
                views,
                step: StepController::new(),
                throttle: InputThrottler::new(),
                telemetry: Telemetry::default(),
                dispatch_task: None,
            }),
            events,
        })
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    pub fn mode(&self) -> ViewerMode {
        self.mode
    }

    /// The viewer slots this session drives, in display order.
    pub fn slots(&self) -> &'static [ViewerSlot] {
        match self.mode {
            ViewerMode::Single => &[ViewerSlot::Main],
            ViewerMode::Dual => &[ViewerSlot::Left, ViewerSlot::Right],
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ViewerEvent> {
        self.events.subscribe()
    }

    /// Opens the channel and, once connected, identifies the user and
    /// requests the initial image for every configured model, then
    /// starts the inbound dispatch task.
    pub async fn connect(self: &Arc<Self>, endpoint: &str) -> Result<()> {
        let (inbound_tx, mut inbound_rx) = mpsc::unbounded_channel();
        self.channel
            .open(endpoint, inbound_tx)
            .await
            .with_context(|| format!("failed to open channel to {endpoint}"))?;
        let _ = self
            .events
            .send(ViewerEvent::ConnectionChanged(ChannelStatus::Connected));

        self.send_session_init().await;

        let session = Arc::clone(self);
        let handle = tokio::spawn(async move {
            while let Some(event) = inbound_rx.recv().await {
                session.handle_backend_event(event).await;
            }
            let _ = session
                .events
                .send(ViewerEvent::ConnectionChanged(ChannelStatus::Disconnected));
        });
        self.inner.lock().await.dispatch_task = Some(handle);
        Ok(())
    }

    /// Detaches the dispatch task and closes the channel. Safe to call
    /// repeatedly or without a prior connect.
    pub async fn disconnect(&self) {
        let task = self.inner.lock().await.dispatch_task.take();
        if let Some(task) = task {
            task.abort();
        }
        self.channel.close().await;
        let _ = self
            .events
            .send(ViewerEvent::ConnectionChanged(ChannelStatus::Disconnected));
    }

    pub async fn connection_status(&self) -> ChannelStatus {
        self.channel.status().await
    }

    /// Throttled key input. An accepted press is forwarded as a
    /// `key_control` command tagged with the current step; a press
    /// inside the throttle window is discarded with no side effect.
    pub async fn on_key_event(&self, key: &str, now_ms: u64) {
        let step = {
            let mut guard = self.inner.lock().await;
            if !guard.throttle.accept(now_ms) {
                debug!(key, "key event inside throttle window, discarded");
                return;
            }
            guard.step.value()
        };
        self.channel
            .send(&ClientCommand::KeyControl {
                key: key.to_string(),
                step,
            })
            .await;
    }

    pub async fn increase_step(&self) {
        let (value, boundary_message) = {
            let mut guard = self.inner.lock().await;
            guard.step.increase();
            (guard.step.value(), guard.step.boundary_message().to_string())
        };
        let _ = self.events.send(ViewerEvent::StepChanged {
            value,
            boundary_message,
        });
    }

    pub async fn decrease_step(&self) {
        let (value, boundary_message) = {
            let mut guard = self.inner.lock().await;
            guard.step.decrease();
            (guard.step.value(), guard.step.boundary_message().to_string())
        };
        let _ = self.events.send(ViewerEvent::StepChanged {
            value,
            boundary_message,
        });
    }

    /// User-triggered reset: bump every in-scope generation marker,
    /// re-request initial images and a pose reset per model, and return
    /// the shared step to its initial value. Single mode also clears the
    /// neighbor images and telemetry locally rather than waiting for a
    /// backend push. Fire and forget — the visual reset and the
    /// backend's authoritative reset race, reconciled by whatever image
    /// push arrives later.
    pub async fn reset(&self) {
        {
            let mut guard = self.inner.lock().await;
            for slot in self.slots() {
                if let Some(view) = guard.views.get_mut(slot) {
                    view.bump_generation();
                    if self.mode == ViewerMode::Single {
                        view.clear_neighbor_images();
                    }
                }
            }
            if self.mode == ViewerMode::Single {
                guard.telemetry = Telemetry::default();
            }
            guard.step.reset();
        }

        for model in &self.identity.model_refs {
            self.channel
                .send(&ClientCommand::GetInitImage(model.clone()))
                .await;
        }
        for model in &self.identity.model_refs {
            self.channel
                .send(&ClientCommand::ResetPose(model.clone()))
                .await;
        }

        for slot in self.slots() {
            let _ = self.events.send(ViewerEvent::ViewUpdated { slot: *slot });
        }
        let _ = self.events.send(ViewerEvent::StepChanged {
            value: step::STEP_MIN,
            boundary_message: String::new(),
        });
        if self.mode == ViewerMode::Single {
            let _ = self.events.send(ViewerEvent::TelemetryUpdated {
                elevation: 0.0,
                heading: 0.0,
            });
        }
        info!("viewer reset issued");
    }

    /// Snapshot of one slot's view state for the renderer.
    pub async fn view(&self, slot: ViewerSlot) -> Option<ViewState> {
        self.inner.lock().await.views.get(&slot).cloned()
    }

    pub async fn step_value(&self) -> u8 {
        self.inner.lock().await.step.value()
    }

    pub async fn boundary_message(&self) -> String {
        self.inner.lock().await.step.boundary_message().to_string()
    }

    pub async fn telemetry(&self) -> Telemetry {
        self.inner.lock().await.telemetry
    }

    async fn send_session_init(&self) {
        let identify = match self.mode {
            ViewerMode::Dual => ClientCommand::SetUserName(self.identity.user_name.clone()),
            ViewerMode::Single => ClientCommand::SetUserData(UserData {
                user_name: self.identity.user_name.clone(),
                model_ids: self.identity.model_refs.clone(),
            }),
        };
        self.channel.send(&identify).await;
        for model in &self.identity.model_refs {
            self.channel
                .send(&ClientCommand::GetInitImage(model.clone()))
                .await;
        }
        info!(user = %self.identity.user_name, "session identified, init images requested");
    }

    async fn handle_backend_event(&self, event: BackendEvent) {
        match event {
            BackendEvent::Response(payload) => {
                debug!(message = %payload.message, "backend response");
            }
            BackendEvent::SetClientInitImage(payload)
            | BackendEvent::SetClientMainImage(payload) => {
                self.apply_primary_image(payload.into_image()).await;
            }
            BackendEvent::NnImg(payload) => {
                self.apply_neighbor_images(payload.into_images()).await;
            }
            BackendEvent::FlightParams { altitude, heading } => {
                self.apply_flight_params(altitude, heading).await;
            }
        }
    }

    // One inbound image push updates every slot in scope: the backend
    // does not disambiguate left/right, so dual mode mirrors the payload
    // into both independently resettable slots.
    async fn apply_primary_image(&self, image: ImageData) {
        {
            let mut guard = self.inner.lock().await;
            for slot in self.slots() {
                if let Some(view) = guard.views.get_mut(slot) {
                    view.set_primary_image(image.clone());
                }
            }
        }
        for slot in self.slots() {
            let _ = self.events.send(ViewerEvent::ViewUpdated { slot: *slot });
        }
    }

    async fn apply_neighbor_images(&self, images: Vec<ImageData>) {
        {
            let mut guard = self.inner.lock().await;
            for slot in self.slots() {
                if let Some(view) = guard.views.get_mut(slot) {
                    view.set_neighbor_images(images.clone());
                }
            }
        }
        for slot in self.slots() {
            let _ = self.events.send(ViewerEvent::ViewUpdated { slot: *slot });
        }
    }

    async fn apply_flight_params(&self, altitude: f64, heading: f64) {
        if self.mode != ViewerMode::Single {
            debug!("ignoring flight_params outside single-view mode");
            return;
        }
        {
            let mut guard = self.inner.lock().await;
            guard.telemetry = Telemetry {
                elevation: altitude,
                heading,
            };
        }
        let _ = self.events.send(ViewerEvent::TelemetryUpdated {
            elevation: altitude,
            heading,
        });
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
