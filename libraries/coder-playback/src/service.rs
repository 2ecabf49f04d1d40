//! Player service
//!
//! Runs a [`PlaybackController`] on its own task. User operations arrive as
//! [`PlayerCommand`]s through a [`PlayerHandle`]; embed callbacks, sampler
//! ticks and credential changes arrive on their own channels. The task
//! handles exactly one of them at a time, then publishes a fresh
//! [`PlayerSnapshot`] and any pending [`PlayerEvent`]s.

use crate::controller::{PlaybackController, PlayerSnapshot};
use crate::embed::{EmbedEvent, EmbedWidget};
use crate::error::{PlaybackError, Result};
use crate::events::PlayerEvent;
use crate::sampler::{SamplerTicks, SeekPointer};
use crate::types::PlayerConfig;
use coder_core::{CredentialGate, CredentialWatch, Track, TrackId};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Request sent to the player task
#[derive(Debug)]
pub enum PlayerCommand {
    SetQueue {
        tracks: Vec<Track>,
        focus: Option<TrackId>,
    },
    PlayTrack {
        track: Track,
        queue: Option<Vec<Track>>,
        reply: oneshot::Sender<Result<()>>,
    },
    Next {
        reply: oneshot::Sender<Result<()>>,
    },
    Previous {
        reply: oneshot::Sender<Result<()>>,
    },
    TogglePlayPause {
        reply: oneshot::Sender<Result<()>>,
    },
    Play {
        reply: oneshot::Sender<Result<()>>,
    },
    Pause {
        reply: oneshot::Sender<Result<()>>,
    },
    SeekPress {
        pointer: SeekPointer,
        reply: oneshot::Sender<bool>,
    },
    SeekMove {
        pointer: SeekPointer,
        reply: oneshot::Sender<bool>,
    },
    SeekRelease,
    SeekTo {
        seconds: f64,
        reply: oneshot::Sender<bool>,
    },
    SetVolume(u8),
    ToggleMute,
    Mute,
    Unmute,
    Shutdown,
}

/// Cloneable handle to a running [`PlayerService`]
///
/// Every method fails with [`PlaybackError::ServiceStopped`] once the
/// service task has exited.
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    commands: mpsc::Sender<PlayerCommand>,
    snapshot: watch::Receiver<PlayerSnapshot>,
    events: broadcast::Sender<PlayerEvent>,
}

impl PlayerHandle {
    pub async fn set_queue(&self, tracks: Vec<Track>, focus: Option<TrackId>) -> Result<()> {
        self.send(PlayerCommand::SetQueue { tracks, focus }).await
    }

    pub async fn play_track(&self, track: Track, queue: Option<Vec<Track>>) -> Result<()> {
        self.request(|reply| PlayerCommand::PlayTrack {
            track,
            queue,
            reply,
        })
        .await?
    }

    pub async fn next(&self) -> Result<()> {
        self.request(|reply| PlayerCommand::Next { reply }).await?
    }

    pub async fn previous(&self) -> Result<()> {
        self.request(|reply| PlayerCommand::Previous { reply }).await?
    }

    pub async fn toggle_play_pause(&self) -> Result<()> {
        self.request(|reply| PlayerCommand::TogglePlayPause { reply })
            .await?
    }

    pub async fn play(&self) -> Result<()> {
        self.request(|reply| PlayerCommand::Play { reply }).await?
    }

    pub async fn pause(&self) -> Result<()> {
        self.request(|reply| PlayerCommand::Pause { reply }).await?
    }

    /// Start a seek gesture; `false` when nothing is seekable
    pub async fn seek_press(&self, pointer: SeekPointer) -> Result<bool> {
        self.request(|reply| PlayerCommand::SeekPress { pointer, reply })
            .await
    }

    pub async fn seek_move(&self, pointer: SeekPointer) -> Result<bool> {
        self.request(|reply| PlayerCommand::SeekMove { pointer, reply })
            .await
    }

    pub async fn seek_release(&self) -> Result<()> {
        self.send(PlayerCommand::SeekRelease).await
    }

    pub async fn seek_to(&self, seconds: f64) -> Result<bool> {
        self.request(|reply| PlayerCommand::SeekTo { seconds, reply })
            .await
    }

    pub async fn set_volume(&self, level: u8) -> Result<()> {
        self.send(PlayerCommand::SetVolume(level)).await
    }

    pub async fn toggle_mute(&self) -> Result<()> {
        self.send(PlayerCommand::ToggleMute).await
    }

    pub async fn mute(&self) -> Result<()> {
        self.send(PlayerCommand::Mute).await
    }

    pub async fn unmute(&self) -> Result<()> {
        self.send(PlayerCommand::Unmute).await
    }

    /// Stop the service task
    pub async fn shutdown(&self) -> Result<()> {
        self.send(PlayerCommand::Shutdown).await
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> PlayerSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Follow snapshot updates
    pub fn subscribe(&self) -> watch::Receiver<PlayerSnapshot> {
        self.snapshot.clone()
    }

    /// Receive events published from now on
    pub fn events(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    async fn send(&self, command: PlayerCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| PlaybackError::ServiceStopped)
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> PlayerCommand,
    ) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.send(command(reply)).await?;
        response.await.map_err(|_| PlaybackError::ServiceStopped)
    }
}

/// Task owning one [`PlaybackController`]
pub struct PlayerService<W> {
    controller: PlaybackController<W>,
    commands: mpsc::Receiver<PlayerCommand>,
    embed_events: mpsc::UnboundedReceiver<EmbedEvent>,
    ticks: SamplerTicks,
    credential: CredentialWatch,
    watching_credential: bool,
    snapshot: watch::Sender<PlayerSnapshot>,
    events: broadcast::Sender<PlayerEvent>,
}

impl<W: EmbedWidget> PlayerService<W> {
    /// Build the service and its handle
    ///
    /// `embed_events` is the receiving half of the
    /// [`crate::event_channel`] the widget reports through.
    pub fn new(
        config: &PlayerConfig,
        widget: W,
        embed_events: mpsc::UnboundedReceiver<EmbedEvent>,
        gate: CredentialGate,
    ) -> (Self, PlayerHandle) {
        let credential = gate.watch();
        let (controller, ticks) = PlaybackController::new(config, widget, gate);

        let (command_tx, command_rx) = mpsc::channel(config.command_buffer.max(1));
        let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());
        let (event_tx, _) = broadcast::channel(config.event_buffer.max(1));

        let handle = PlayerHandle {
            commands: command_tx,
            snapshot: snapshot_rx,
            events: event_tx.clone(),
        };

        let service = Self {
            controller,
            commands: command_rx,
            embed_events,
            ticks,
            credential,
            watching_credential: true,
            snapshot: snapshot_tx,
            events: event_tx,
        };
        (service, handle)
    }

    /// Process inputs until shut down or every handle is dropped
    ///
    /// The controller is unmounted on the way out.
    pub async fn run(mut self) {
        info!("Player service started");

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(PlayerCommand::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(event) = self.embed_events.recv() => {
                    self.controller.handle_embed_event(event);
                }
                Some(tick) = self.ticks.recv() => {
                    self.controller.on_sample_tick(tick);
                }
                open = self.credential.changed(), if self.watching_credential => match open {
                    Some(open) => self.controller.credential_changed(open),
                    None => self.watching_credential = false,
                },
            }
            self.publish();
        }

        self.controller.unmount();
        self.publish();
        info!("Player service stopped");
    }

    /// Run on a new Tokio task
    pub fn spawn(self) -> JoinHandle<()>
    where
        W: Send + 'static,
    {
        tokio::spawn(self.run())
    }

    fn handle_command(&mut self, command: PlayerCommand) {
        debug!(?command, "Handling player command");

        match command {
            PlayerCommand::SetQueue { tracks, focus } => {
                self.controller.set_queue(tracks, focus.as_ref());
            }
            PlayerCommand::PlayTrack {
                track,
                queue,
                reply,
            } => {
                let result = self.controller.play_track(track, queue);
                self.reply(reply, result);
            }
            PlayerCommand::Next { reply } => {
                let result = self.controller.next();
                self.reply(reply, result);
            }
            PlayerCommand::Previous { reply } => {
                let result = self.controller.previous();
                self.reply(reply, result);
            }
            PlayerCommand::TogglePlayPause { reply } => {
                let result = self.controller.toggle_play_pause();
                self.reply(reply, result);
            }
            PlayerCommand::Play { reply } => {
                let result = self.controller.play();
                self.reply(reply, result);
            }
            PlayerCommand::Pause { reply } => {
                let result = self.controller.pause();
                self.reply(reply, result);
            }
            PlayerCommand::SeekPress { pointer, reply } => {
                let accepted = self.controller.seek_press(pointer);
                self.reply(reply, accepted);
            }
            PlayerCommand::SeekMove { pointer, reply } => {
                let accepted = self.controller.seek_move(pointer);
                self.reply(reply, accepted);
            }
            PlayerCommand::SeekRelease => self.controller.seek_release(),
            PlayerCommand::SeekTo { seconds, reply } => {
                let accepted = self.controller.seek_to(seconds);
                self.reply(reply, accepted);
            }
            PlayerCommand::SetVolume(level) => self.controller.set_volume(level),
            PlayerCommand::ToggleMute => self.controller.toggle_mute(),
            PlayerCommand::Mute => self.controller.mute(),
            PlayerCommand::Unmute => self.controller.unmute(),
            // Handled by the run loop
            PlayerCommand::Shutdown => {}
        }
    }

    /// Publish first so the caller sees the outcome once the reply lands
    fn reply<T>(&mut self, reply: oneshot::Sender<T>, value: T) {
        self.publish();
        let _ = reply.send(value);
    }

    fn publish(&mut self) {
        for event in self.controller.drain_events() {
            // No subscribers is fine
            let _ = self.events.send(event);
        }

        let snapshot = self.controller.snapshot();
        self.snapshot.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}
