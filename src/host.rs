use std::sync::Arc;

use winit::window::Window;

use crate::error::HostBridgeAbsent;

/// Platform that embeds the viewer and wants to hear when it is ready
pub trait HostBridge {
    /// Signals that the viewer has started
    fn ready(&self);

    /// Asks the host to give the viewer as much space as it can
    fn expand(&self);
}

/// Bridge backed by the viewer's own window
pub struct WindowHostBridge {
    window: Arc<Window>,
}

impl WindowHostBridge {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window }
    }
}

impl HostBridge for WindowHostBridge {
    fn ready(&self) {
        self.window.set_visible(true);
        self.window.focus_window();
    }

    fn expand(&self) {
        self.window.set_maximized(true);
    }
}

/// Returns the window bridge when the deployment enables one
pub fn detect(enabled: bool, window: &Arc<Window>) -> Result<WindowHostBridge, HostBridgeAbsent> {
    if !enabled {
        return Err(HostBridgeAbsent("host bridge disabled in config".to_string()));
    }
    Ok(WindowHostBridge::new(window.clone()))
}

/// Runs the startup handshake: `ready` then `expand`
pub fn handshake(bridge: &dyn HostBridge) {
    bridge.ready();
    bridge.expand();
    log::info!("Host bridge notified");
}

/// Handshakes with a detected bridge, or logs its absence and carries on
pub fn announce<B: HostBridge>(bridge: Result<B, HostBridgeAbsent>) {
    match bridge {
        Ok(bridge) => handshake(&bridge),
        Err(absent) => log::debug!("{}", absent),
    }
}
