// File: ./src/system.rs
use notify_rust::Notification;

/// Displays a reminder to the user. Fire-and-forget: implementations never
/// report back, and the engine never waits on delivery.
pub trait Notifier: Send + Sync {
    fn notify(&self, id: u32, title: &str, body: &str);
}

/// Delivery through the desktop notification service.
///
/// The show call runs on a detached thread so a slow or absent notification
/// daemon never blocks an evaluation pass. The stable id is not forwarded
/// here — the XDG backend assigns its own — but mobile shells and tests use
/// it for replace/dedup semantics.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, _id: u32, title: &str, body: &str) {
        let summary = title.to_string();
        let body = body.to_string();
        std::thread::spawn(move || {
            let _ = Notification::new()
                .summary(&summary)
                .body(&body)
                .appname("Noubli")
                .show();
        });
    }
}
