use std::sync::Arc;

use chess::{GameState, PieceKind, Square};
use chess_client::{PushStream, RoomClient, ServerPush, Transport};
use futures::future::{self, BoxFuture};
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tracing::Instrument;

use super::dialog::DialogBridge;
use super::error::SessionError;
use super::machine::{Effect, Input, InteractionMachine, InteractionState};
use super::query::MoveQuery;
use super::store::GameStateStore;
use crate::config::SessionConfig;
use crate::view::{BoardView, Notification};

/// What woke the session loop.
enum Wake {
    Push(Option<chess_client::ClientResult<ServerPush>>),
    Settled(Input),
}

/// One joined game room.
///
/// Owns the state store, the interaction machine and the render model for the
/// lifetime of the session. UI events go in through the `click`/`press_*`
/// methods; server pushes and finished requests are processed by [`step`].
///
/// [`step`]: GameSession::step
pub struct GameSession {
    config: SessionConfig,
    room: RoomClient,
    pushes: PushStream,
    pushes_closed: bool,
    store: GameStateStore,
    query: MoveQuery,
    machine: InteractionMachine,
    dialogs: DialogBridge,
    view: BoardView,
    in_flight: FuturesUnordered<BoxFuture<'static, Input>>,
    span: tracing::Span,
}

impl GameSession {
    /// Join the room and render the initial state.
    ///
    /// Fails before anything is rendered if the join or the initial fetch
    /// fails.
    pub async fn start(
        config: SessionConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, SessionError> {
        let span = tracing::info_span!("session", game = %config.game_code);

        async move {
            let params = config.join_params();
            let topic = params.topic();

            let (room, pushes) = RoomClient::join(transport, &params, config.request_timeout)
                .await
                .map_err(|source| SessionError::Join {
                    topic: topic.clone(),
                    source,
                })?;
            tracing::info!(topic = %topic, color = %config.color, role = ?config.role, "Joined room");

            let initial = room
                .get_game_state()
                .await
                .map_err(SessionError::InitialState)?;

            let mut view = BoardView::new();
            let store = GameStateStore::new(initial, &mut view);
            view.hide_loader();
            tracing::info!(turn = %store.current().turn, "Session ready");

            Ok(Self {
                machine: InteractionMachine::new(config.color, config.role),
                query: MoveQuery::new(room.clone()),
                config,
                room,
                pushes,
                pushes_closed: false,
                store,
                dialogs: DialogBridge::new(),
                view,
                in_flight: FuturesUnordered::new(),
                span: tracing::Span::current(),
            })
        }
        .instrument(span)
        .await
    }

    pub fn view(&self) -> &BoardView {
        &self.view
    }

    pub fn game(&self) -> &GameState {
        self.store.current()
    }

    pub fn state(&self) -> &InteractionState {
        self.machine.state()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_ended(&self) -> bool {
        self.machine.is_ended()
    }

    /// Number of requests and dialogs still waiting to complete.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn click(&mut self, square: Square) {
        self.dispatch(Input::CellClicked(square));
    }

    pub fn press_resign(&mut self) {
        self.dispatch(Input::ResignPressed);
    }

    pub fn press_draw(&mut self) {
        self.dispatch(Input::DrawPressed);
    }

    /// Answer the open promotion dialog. Returns false if none is open or
    /// `kind` was not offered.
    pub fn choose_promotion(&mut self, kind: PieceKind) -> bool {
        let resolved = self.dialogs.choose_piece(kind);
        self.view.sync_dialog(self.dialogs.prompt());
        resolved
    }

    /// Answer the open confirmation dialog.
    pub fn answer_confirmation(&mut self, confirmed: bool) -> bool {
        let resolved = self.dialogs.answer(confirmed);
        self.view.sync_dialog(self.dialogs.prompt());
        resolved
    }

    /// Close the open dialog without answering.
    pub fn cancel_dialog(&mut self) -> bool {
        let closed = self.dialogs.dismiss();
        self.view.sync_dialog(self.dialogs.prompt());
        closed
    }

    pub fn dismiss_notification(&mut self) -> bool {
        self.view.dismiss_notification()
    }

    /// Wait for the next push or completed request and apply it.
    ///
    /// Pushes are handled before completions. Returns false once the push
    /// stream has closed and nothing is left in flight.
    pub async fn step(&mut self) -> bool {
        let wake = tokio::select! {
            biased;
            push = self.pushes.next(), if !self.pushes_closed => Wake::Push(push),
            Some(input) = self.in_flight.next(), if !self.in_flight.is_empty() => Wake::Settled(input),
            else => return false,
        };

        let input = match wake {
            Wake::Push(Some(Ok(push))) => self.on_push(push),
            Wake::Push(Some(Err(e))) => {
                let _enter = self.span.enter();
                tracing::warn!("Dropping undecodable push: {}", e);
                return true;
            }
            Wake::Push(None) => {
                self.pushes_closed = true;
                Input::Disconnected
            }
            Wake::Settled(input) => input,
        };
        self.dispatch(input);
        true
    }

    fn on_push(&mut self, push: ServerPush) -> Input {
        match push {
            ServerPush::GameStateUpdated(next) => {
                self.store.replace(next, &mut self.view);
                Input::StateReplaced
            }
            ServerPush::GameOver(over) => Input::GameOver(over),
            ServerPush::DrawRequested { by } => Input::DrawRequested { by },
        }
    }

    fn dispatch(&mut self, input: Input) {
        let span = self.span.clone();
        let _enter = span.enter();
        let effects = self.machine.handle(input, self.store.current());
        for effect in effects {
            self.apply(effect);
        }
        self.view.mark_selection(self.machine.selection());
        self.view.sync_dialog(self.dialogs.prompt());
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::QueryMoves(ticket) => {
                let query = self.query.clone();
                self.spawn(async move {
                    let result = query.valid_moves(ticket.square).await;
                    Input::MovesLoaded { ticket, result }
                });
            }
            Effect::Send(request) => {
                let room = self.room.clone();
                self.spawn(async move {
                    let result = room.request(request).await.map(drop);
                    Input::RequestSettled { request, result }
                });
            }
            Effect::OpenPromotion { from, to } => {
                tracing::debug!(%from, %to, "Opening promotion dialog");
                match self.dialogs.request_promotion(&PieceKind::PROMOTIONS) {
                    Ok(ticket) => {
                        self.spawn(async move { Input::PromotionChosen(ticket.resolved().await) })
                    }
                    Err(e) => {
                        tracing::error!("{}", e);
                        self.spawn(future::ready(Input::PromotionChosen(None)));
                    }
                }
            }
            Effect::OpenConfirmation(kind) => {
                match self.dialogs.request_confirmation(kind.header(), kind.message()) {
                    Ok(ticket) => self.spawn(async move {
                        Input::ConfirmationResolved(ticket.resolved().await)
                    }),
                    Err(e) => {
                        tracing::error!("{}", e);
                        self.spawn(future::ready(Input::ConfirmationResolved(None)));
                    }
                }
            }
            Effect::CloseDialog => {
                self.dialogs.dismiss();
            }
            Effect::Notify(notification) => self.view.notify(notification),
            Effect::AnnounceResult(over) => self.view.notify(Notification::game_over(
                &over,
                self.config.game_over_notice,
            )),
            Effect::ConnectionLost(result) => {
                self.view.blank();
                self.view
                    .notify(Notification::connection_lost(result.as_ref()));
            }
        }
    }

    fn spawn<F>(&mut self, fut: F)
    where
        F: std::future::Future<Output = Input> + Send + 'static,
    {
        self.in_flight.push(fut.instrument(self.span.clone()).boxed());
    }
}
