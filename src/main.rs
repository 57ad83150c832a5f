//! Area Desktop
//!
//! Drives the window core from a stream of newline-delimited JSON client
//! events (a session script given as the first argument, or stdin) and
//! prints every core event as a JSON line on stdout.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use area_desktop::config::Config;
use area_desktop::desktop::workspace::Monitor;
use area_desktop::desktop::{Desktop, DesktopError, FullscreenState, NewWindow, PropertyAssignment, WindowHandle};
use area_desktop::ipc::{ClientEvent, CoreEvent};

/// Animation tick rate
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Main application state
struct DesktopApp {
    desktop: Desktop,

    /// Client surface ids and the windows they were bound to
    surfaces: HashMap<u64, WindowHandle>,

    /// Events produced here rather than by the core
    outbox: Vec<CoreEvent>,

    last_frame: Instant,
}

impl DesktopApp {
    fn new(config: Config) -> Self {
        Self {
            desktop: Desktop::new(config),
            surfaces: HashMap::new(),
            outbox: Vec::new(),
            last_frame: Instant::now(),
        }
    }

    fn window(&self, surface: u64) -> Result<WindowHandle, DesktopError> {
        self.surfaces
            .get(&surface)
            .copied()
            .filter(|&h| self.desktop.valid(h))
            .ok_or(DesktopError::InvalidWindow)
    }

    fn handle(&mut self, event: ClientEvent) -> Result<()> {
        match event {
            ClientEvent::AddMonitor { id, name, area } => {
                self.desktop.add_monitor(Monitor::new(id, name, area))?;
            }
            ClientEvent::AddWorkspace { id, name, monitor } => {
                self.desktop.add_workspace(id, name, monitor)?;
            }
            ClientEvent::SetWorkspaceRule { workspace, rule } => {
                self.desktop.set_workspace_rule(workspace, rule)?;
            }
            ClientEvent::NewSurface {
                surface,
                kind,
                title,
                class,
                workspace_token,
                requests_float,
                override_redirect,
            } => {
                let window = self.desktop.create_window(NewWindow {
                    kind,
                    title,
                    class,
                    workspace_token,
                    requests_float,
                    override_redirect,
                });
                if let Some(stale) = self.surfaces.insert(surface, window) {
                    warn!("Surface {} reused, dropping binding to {:?}", surface, stale);
                }
                self.outbox.push(CoreEvent::SurfaceBound { surface, window });
            }
            ClientEvent::Map { surface, rules } => {
                let window = self.window(surface)?;
                self.desktop.on_map(window, rules)?;
            }
            ClientEvent::Unmap { surface } => {
                let window = self.window(surface)?;
                self.desktop.on_unmap(window)?;
            }
            ClientEvent::Destroy { surface } => {
                let window = self.window(surface)?;
                self.surfaces.remove(&surface);
                self.desktop.destroy_window(window)?;
            }
            ClientEvent::AckConfigure { surface, serial } => {
                let window = self.window(surface)?;
                self.desktop.on_ack(window, serial)?;
            }
            ClientEvent::X11ConfigureRequest { surface, rect } => {
                let window = self.window(surface)?;
                self.desktop.on_x11_configure_request(window, rect)?;
            }
            ClientEvent::TitleChanged { surface, title } => {
                let window = self.window(surface)?;
                self.desktop.set_title(window, title)?;
            }
            ClientEvent::SizeHints { surface, min, max } => {
                let window = self.window(surface)?;
                self.desktop.set_size_hints(window, min, max)?;
            }
            ClientEvent::FullscreenRequest { surface, mode, output } => {
                let window = self.window(surface)?;
                self.desktop.on_client_fullscreen_request(window, mode, output)?;
            }
            ClientEvent::FullscreenReport { surface, mode } => {
                let window = self.window(surface)?;
                self.desktop.on_client_fullscreen_report(window, mode)?;
            }
            ClientEvent::Activate { surface, force } => {
                let window = self.window(surface)?;
                self.desktop.activate(window, force)?;
            }
            ClientEvent::UpdateRules { surface, rules } => {
                let window = self.window(surface)?;
                self.desktop.update_rules(window, rules)?;
            }
            ClientEvent::SetProp { surface, property, value } => {
                let window = self.window(surface)?;
                let assignment = PropertyAssignment::parse(&property, &value)
                    .with_context(|| format!("Invalid property assignment {} = {}", property, value))?;
                self.desktop.set_prop(window, assignment)?;
            }
            ClientEvent::Swallow { swallower, swallowed } => {
                let (swallower, swallowed) = (self.window(swallower)?, self.window(swallowed)?);
                if !self.desktop.swallow(swallower, swallowed)? {
                    debug!("Swallow of {:?} by {:?} refused", swallowed, swallower);
                }
            }
            ClientEvent::RegisterWorkspaceToken { owner, workspace } => {
                let window = self.window(owner)?;
                let token = self.desktop.register_workspace_token(window, workspace)?;
                info!("Workspace token {} registered for workspace {}", token, workspace);
            }
            ClientEvent::Focus { surface } => {
                let window = surface.map(|s| self.window(s)).transpose()?;
                self.desktop.focus_window(window);
            }
            ClientEvent::CycleFocus { forward } => {
                self.desktop.cycle_focus(forward);
            }
            ClientEvent::SwitchWorkspace { workspace } => self.desktop.switch_workspace(workspace)?,
            ClientEvent::MoveToWorkspace { surface, workspace } => {
                let window = self.window(surface)?;
                self.desktop.move_to_workspace(window, workspace)?;
            }
            ClientEvent::SetWindowBox { surface, rect } => {
                let window = self.window(surface)?;
                self.desktop.set_window_box(window, rect, true)?;
            }
            ClientEvent::Pin { surface, pinned } => {
                let window = self.window(surface)?;
                if !self.desktop.set_pinned(window, pinned)? {
                    debug!("Pin state of surface {} unchanged", surface);
                }
            }
            ClientEvent::SetFullscreen { surface, mode } => {
                let window = self.window(surface)?;
                let state = FullscreenState { internal: mode, client: mode };
                self.desktop.set_window_fullscreen_state(window, state)?;
            }
            ClientEvent::ToggleGroup { surface } => {
                let window = self.window(surface)?;
                let changed = if self.desktop.is_grouped(window) {
                    self.desktop.destroy_group(window)
                } else {
                    self.desktop.create_group(window)
                };
                if !changed {
                    debug!("Group toggle on surface {} refused", surface);
                }
            }
            ClientEvent::LockGroup { surface, locked } => {
                let window = self.window(surface)?;
                self.desktop.set_group_locked(window, locked);
            }
            ClientEvent::ChangeGroupActive { surface, forward } => {
                let window = self.window(surface)?;
                self.desktop.change_group_active(window, forward);
            }
            ClientEvent::MoveOutOfGroup { surface } => {
                let window = self.window(surface)?;
                self.desktop.move_out_of_group(window);
            }
            ClientEvent::MoveIntoGroup { surface, target } => {
                let (window, target) = (self.window(surface)?, self.window(target)?);
                if !self.desktop.insert_window_to_group(window, target) {
                    debug!("Surface {} may not join that group", surface);
                }
            }
            ClientEvent::ReloadConfig => {
                let config = Config::load().context("Failed to reload configuration")?;
                self.desktop.set_config(config);
            }
        }
        Ok(())
    }

    /// Advance animations by the real time since the last frame
    fn tick(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame);
        self.last_frame = now;

        let released = self.desktop.tick_animations(dt);
        if !released.is_empty() {
            self.surfaces.retain(|_, h| !released.contains(h));
        }
    }

    /// Write every queued core event to stdout
    async fn flush(&mut self, out: &mut tokio::io::Stdout) -> Result<()> {
        let mut events = std::mem::take(&mut self.outbox);
        events.extend(self.desktop.take_events());
        for event in events {
            let mut line = serde_json::to_vec(&event)?;
            line.push(b'\n');
            out.write_all(&line).await.context("Failed to write event")?;
        }
        out.flush().await?;
        Ok(())
    }

    async fn run(mut self, input: Box<dyn AsyncRead + Unpin + Send>) -> Result<()> {
        let mut lines = BufReader::new(input).lines();
        let mut stdout = tokio::io::stdout();
        let mut frame = tokio::time::interval(FRAME_INTERVAL);
        frame.tick().await; // Skip first immediate tick
        let mut input_open = true;

        info!("Window core ready");

        loop {
            tokio::select! {
                line = lines.next_line(), if input_open => {
                    match line.context("Failed to read client event")? {
                        Some(line) if line.trim().is_empty() => {}
                        Some(line) => {
                            let result = serde_json::from_str::<ClientEvent>(&line)
                                .context("Malformed client event")
                                .and_then(|event| self.handle(event));
                            if let Err(e) = result {
                                warn!("Client event failed: {:#}", e);
                                self.outbox.push(CoreEvent::Error { message: format!("{:#}", e) });
                            }
                        }
                        None => {
                            info!("Input closed, finishing animations");
                            input_open = false;
                        }
                    }
                }
                _ = frame.tick() => {
                    self.tick();
                    if !input_open && self.desktop.windows().all(|(_, w)| !w.flags.fading_out) {
                        self.flush(&mut stdout).await?;
                        return Ok(());
                    }
                }
            }
            self.flush(&mut stdout).await?;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (stderr, stdout carries the event stream)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "area_desktop=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting Area Desktop");

    let config = Config::load().context("Failed to load configuration")?;

    let input: Box<dyn AsyncRead + Unpin + Send> = match std::env::args().nth(1) {
        Some(path) => {
            info!("Replaying session from {}", path);
            Box::new(
                tokio::fs::File::open(&path)
                    .await
                    .with_context(|| format!("Failed to open session {}", path))?,
            )
        }
        None => Box::new(tokio::io::stdin()),
    };

    // Setup signal handlers for graceful shutdown
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        let tx = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully");
                    let _ = tx.send(()).await;
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully");
                    let _ = tx.send(()).await;
                }
            }
        });
    }

    let app = DesktopApp::new(config);

    tokio::select! {
        result = app.run(input) => {
            if let Err(e) = result {
                error!("Application error: {:#}", e);
                return Err(e);
            }
        }
        _ = shutdown_rx.recv() => {
            info!("Shutdown signal received");
        }
    }

    drop(shutdown_tx);
    Ok(())
}
