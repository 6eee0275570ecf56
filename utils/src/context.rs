use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// A cancellation signal shared by everything a service spawns.
///
/// Each clone also keeps the matching [`Handler`] from finishing its
/// [`Handler::cancel`], so shutdown waits until every holder has let go.
#[derive(Clone)]
pub struct Context {
	token: CancellationToken,
	_alive: mpsc::Sender<()>,
}

/// The owning side of a [`Context`].
pub struct Handler {
	token: CancellationToken,
	alive: mpsc::Receiver<()>,
}

impl Context {
	pub fn new() -> (Self, Handler) {
		let token = CancellationToken::new();
		// Nothing is ever sent, the channel only tracks how many contexts exist.
		let (alive_send, alive_recv) = mpsc::channel(1);

		(
			Self {
				token: token.clone(),
				_alive: alive_send,
			},
			Handler {
				token,
				alive: alive_recv,
			},
		)
	}

	/// Resolves once the handler cancels.
	pub async fn done(&self) {
		self.token.cancelled().await
	}

	pub fn is_done(&self) -> bool {
		self.token.is_cancelled()
	}
}

impl Handler {
	/// Cancels every context and waits until all of them are dropped.
	pub async fn cancel(mut self) {
		self.token.cancel();

		while self.alive.recv().await.is_some() {}
	}
}
