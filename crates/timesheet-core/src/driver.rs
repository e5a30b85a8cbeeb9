use tokio::time::sleep_until;
use tracing::trace;

use crate::adapter::CalendarWidget;
use crate::modal::ModalTransition;
use crate::remote::RemoteSync;
use crate::session::Session;

/// Sleeps through every pending dialog
/// timer and returns the transitions of
/// the time entry dialog in order.
pub async fn settle<R, W>(
  session: &mut Session<R, W>
) -> Vec<ModalTransition>
where
  R: RemoteSync,
  W: CalendarWidget
{
  let mut fired = Vec::new();
  while let Some(deadline) =
    session.next_deadline()
  {
    trace!(?deadline, "waiting for dialog timer");
    sleep_until(deadline).await;
    if let Some(transition) =
      session.tick()
    {
      fired.push(transition);
    }
  }
  fired
}
