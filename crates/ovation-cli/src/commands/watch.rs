//! Foreground run loop for the two scheduler tasks.
//!
//! Stands in for the resident host process: announcements and live
//! display refreshes print to stdout.

use std::sync::{Arc, Mutex};

use ovation_core::broadcaster::{self, BROADCAST_PERIOD};
use ovation_core::monitor::{self, MONITOR_PERIOD};
use ovation_core::{Clock, DisplayHandle, NotificationSink, SystemClock};

use super::{open_campaign, open_countdowns, CmdResult};

/// Sink that writes every delivery and edit to stdout.
struct TerminalSink;

impl NotificationSink for TerminalSink {
    fn send(&self, content: &str) -> Result<DisplayHandle, Box<dyn std::error::Error>> {
        println!("{content}");
        Ok(DisplayHandle::new())
    }

    fn edit(&self, _handle: DisplayHandle, content: &str) -> bool {
        println!("{content}");
        true
    }
}

pub fn run(live: Option<String>) -> CmdResult {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let campaign = Arc::new(Mutex::new(open_campaign()?));
        let mut countdowns = open_countdowns()?;
        let sink: Arc<dyn NotificationSink> = Arc::new(TerminalSink);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        if let Some(event) = live {
            let handle = sink.send(&format!("Live countdown: {event}"))?;
            countdowns.register_live(handle, &event)?;
        }
        let countdowns = Arc::new(Mutex::new(countdowns));

        let monitor_task = monitor::spawn(campaign, sink.clone(), clock.clone(), MONITOR_PERIOD);
        let broadcast_task =
            broadcaster::spawn(countdowns, sink.clone(), clock.clone(), BROADCAST_PERIOD);

        println!("Watching deadlines and countdowns. Press Ctrl-C to stop.");
        tokio::signal::ctrl_c().await?;

        monitor_task.stop().await;
        broadcast_task.stop().await;
        Ok(())
    })
}
