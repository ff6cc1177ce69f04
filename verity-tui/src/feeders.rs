use crate::app::TuiMsg;
use std::time::Duration;
use tokio::{sync::mpsc, time};
use tokio_util::sync::CancellationToken;

const INPUT_POLL: Duration = Duration::from_millis(100);
pub const TICK_RATE: Duration = Duration::from_millis(80);

/// Start the terminal input reader and the redraw ticker.
///
/// Both stop when `shutdown` is cancelled. The reader polls with a short
/// timeout so the blocking thread never outlives the UI.
pub fn spawn_tui_feeders(tui: mpsc::Sender<TuiMsg>, shutdown: CancellationToken) {
    let tui_in = tui.clone();
    let shutdown_input = shutdown.clone();
    tokio::spawn(async move {
        loop {
            let read = tokio::task::spawn_blocking(|| {
                if crossterm::event::poll(INPUT_POLL)? {
                    crossterm::event::read().map(Some)
                } else {
                    Ok(None)
                }
            });
            tokio::select! {
                _ = shutdown_input.cancelled() => break,
                ev = read => match ev {
                    Ok(Ok(Some(e))) => {
                        if tui_in.send(TuiMsg::InputEvent(e)).await.is_err() {
                            break;
                        }
                    }
                    Ok(Ok(None)) => {}
                    Ok(Err(e)) => {
                        let _ = tui_in.send(TuiMsg::OpError(format!("input: {e}"))).await;
                    }
                    Err(_) => break,
                }
            }
        }
    });

    let tui_tick = tui;
    tokio::spawn(async move {
        let mut interval = time::interval(TICK_RATE);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    let _ = tui_tick.try_send(TuiMsg::Tick);
                }
            }
        }
    });
}
