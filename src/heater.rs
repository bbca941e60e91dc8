// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The heater controller.
//!
//! [`Heater`] owns the local state store, the hardware drivers and the
//! outbound half of the transport. Every stimulus (a report tick, a shadow
//! event, an RPC request) is handled to completion before the next one is
//! looked at, so the state store needs no locking.
//!
//! # Startup
//!
//! 1. [`Heater::new`] configures the relay pin and samples the sensor.
//! 2. [`Heater::run`] writes the current state to the relay once.
//! 3. [`Heater::run`] then serves report ticks and inbound messages until
//!    the inbound channel closes.

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::command::{HeaterCommand, SetStateRequest, SetStateResponse};
use crate::config::HeaterConfig;
use crate::error::{ConfigError, ProtocolError};
use crate::event::ShadowEvent;
use crate::hal::{OutputPin, Relay, TemperatureSensor};
use crate::protocol::{Inbound, RpcError, RpcReply, RpcRequest, ShadowTransport, ShadowUpdate};
use crate::reconcile::reconcile;
use crate::state::{DeviceState, ShadowDocument};

/// Controller keeping a heater relay in sync with its device shadow.
///
/// # Examples
///
/// ```
/// use heater_shadow::hal::sim::{SimulatedBus, SimulatedPin};
/// use heater_shadow::hal::Mcp9808;
/// use heater_shadow::protocol::MemoryTransport;
/// use heater_shadow::{Heater, HeaterConfig};
///
/// # async fn example() -> Result<(), heater_shadow::error::ConfigError> {
/// let pin = SimulatedPin::new();
/// let transport = MemoryTransport::new();
/// let mut heater = Heater::new(
///     HeaterConfig::new("heater-01"),
///     Mcp9808::new(SimulatedBus::new(0x0164)),
///     pin.clone(),
///     transport.clone(),
/// )?;
///
/// let state = heater.get_state();
/// assert!(!state.on());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Heater<S, P, T> {
    config: HeaterConfig,
    sensor: S,
    relay: Relay<P>,
    transport: T,
    state: DeviceState,
}

impl<S, P, T> Heater<S, P, T>
where
    S: TemperatureSensor,
    P: OutputPin,
    T: ShadowTransport,
{
    /// Creates a controller.
    ///
    /// Configures `pin` as an output and takes the first temperature
    /// sample. The relay starts off in the state store; nothing is written
    /// to the pin until [`run`](Self::run) or [`apply_state`](Self::apply_state).
    ///
    /// # Errors
    ///
    /// Returns error if the configuration does not validate.
    pub fn new(
        config: HeaterConfig,
        mut sensor: S,
        pin: P,
        transport: T,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let relay = Relay::new(pin);
        let temperature = sensor.read_temperature();
        tracing::debug!(thing = %config.thing_name, temperature = %temperature, "Heater initialized");

        Ok(Self {
            config,
            sensor,
            relay,
            transport,
            state: DeviceState::new(temperature),
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &HeaterConfig {
        &self.config
    }

    /// Returns the local state store.
    #[must_use]
    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// Writes the stored `on` flag to the relay.
    pub fn apply_state(&mut self) {
        self.relay.apply_state(self.state.on());
    }

    /// Samples the sensor and the relay pin.
    fn sample(&mut self) -> DeviceState {
        let temperature = self.sensor.read_temperature();
        DeviceState::sampled(self.relay.read_actual_on(), temperature)
    }

    async fn publish_reported(&self, state: DeviceState) -> Result<(), ProtocolError> {
        tracing::info!(on = state.on(), temperature = %state.temperature(), "Reporting state");
        self.transport
            .update_shadow(&ShadowUpdate::Reported(state))
            .await
    }

    /// Reconciles a shadow event with the local state.
    ///
    /// The merged state is stored and, when required, written to the relay
    /// before anything is published.
    ///
    /// # Errors
    ///
    /// Returns error if the resulting `reported` publish fails. The state
    /// store and the relay are updated regardless.
    pub async fn handle_event(&mut self, event: &ShadowEvent) -> Result<(), ProtocolError> {
        match event {
            ShadowEvent::GetAccepted { reported, desired }
            | ShadowEvent::UpdateDelta { reported, desired } => {
                tracing::info!(
                    event = %event.kind(),
                    reported = ?reported,
                    desired = ?desired,
                    "Shadow event"
                );
            }
            _ => tracing::info!(event = %event.kind(), "Shadow event"),
        }

        let outcome = reconcile(event, &self.state);
        self.state = outcome.state;

        if outcome.apply_hardware {
            tracing::debug!(
                on = self.state.on(),
                changed = outcome.changed,
                "Applying merged state"
            );
            self.apply_state();
        }

        match outcome.publish {
            Some(ShadowUpdate::Reported(state)) => self.publish_reported(state).await,
            Some(update) => self.transport.update_shadow(&update).await,
            None => Ok(()),
        }
    }

    /// Handles `Heater.SetState`.
    ///
    /// A provided `on` goes straight to the relay; the state store is left
    /// as it was. A `desired` update carrying the negation of the stored
    /// `on` is then published, so the next delta toggles the stored state
    /// rather than confirming the value just written. The call succeeds
    /// even when that publish fails.
    pub async fn set_state(&mut self, request: SetStateRequest) -> SetStateResponse {
        if let Some(on) = request.on {
            tracing::debug!(on, "Writing relay from command");
            self.relay.apply_state(on);
        }

        let desired = ShadowDocument::with_on(!self.state.on());
        if let Err(e) = self
            .transport
            .update_shadow(&ShadowUpdate::Desired(desired))
            .await
        {
            tracing::warn!(error = %e, "Failed to publish desired state");
        }

        SetStateResponse { success: true }
    }

    /// Handles `Heater.GetState`.
    ///
    /// Returns a live sample of the sensor and the relay pin; the state
    /// store is not touched.
    pub fn get_state(&mut self) -> DeviceState {
        self.sample()
    }

    /// Replaces the state store with a fresh sample and reports it.
    ///
    /// # Errors
    ///
    /// Returns error if the publish fails. The store is updated regardless.
    pub async fn report_tick(&mut self) -> Result<(), ProtocolError> {
        self.state = self.sample();
        self.publish_reported(self.state).await
    }

    /// Executes an RPC request and sends the reply to its caller.
    ///
    /// Requests without `src` are executed but not answered. The reply is
    /// returned either way.
    pub async fn handle_rpc(&mut self, request: &RpcRequest) -> RpcReply {
        tracing::debug!(id = ?request.id, method = %request.method, "RPC request");

        let outcome = match HeaterCommand::parse(&request.method, &request.args) {
            Ok(HeaterCommand::SetState(args)) => {
                let response = self.set_state(args).await;
                to_result(&response)
            }
            Ok(HeaterCommand::GetState) => {
                let state = self.get_state();
                to_result(&state)
            }
            Err(e) => Err(e),
        };

        if let Err(e) = &outcome {
            tracing::warn!(method = %request.method, error = %e, "RPC request failed");
        }

        let reply = RpcReply::to_request(request, self.config.thing_name.clone(), outcome);
        if request.src.is_some()
            && let Err(e) = self.transport.reply_rpc(&reply).await
        {
            tracing::warn!(error = %e, "Failed to send RPC reply");
        }
        reply
    }

    /// Runs the controller until `inbound` closes.
    ///
    /// Writes the stored state to the relay, then reports every
    /// `report_interval` (first report one interval after start) and
    /// handles inbound messages in arrival order. Publish failures are
    /// logged and do not stop the loop.
    pub async fn run(&mut self, mut inbound: mpsc::Receiver<Inbound>) {
        let period = self.config.report_interval();
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.apply_state();
        tracing::info!(
            thing = %self.config.thing_name,
            interval_ms = self.config.report_interval_ms,
            "Heater running"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.report_tick().await {
                        tracing::warn!(error = %e, "Failed to report state");
                    }
                }
                message = inbound.recv() => match message {
                    Some(Inbound::Shadow(event)) => {
                        if let Err(e) = self.handle_event(&event).await {
                            tracing::warn!(
                                event = %event.kind(),
                                error = %e,
                                "Failed to publish after shadow event"
                            );
                        }
                    }
                    Some(Inbound::Rpc(request)) => {
                        self.handle_rpc(&request).await;
                    }
                    None => break,
                },
            }
        }

        tracing::info!(thing = %self.config.thing_name, "Inbound channel closed, heater stopped");
    }
}

fn to_result<V: serde::Serialize>(value: &V) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(|e| RpcError::internal(e.to_string()))
}
