use crate::error::ServiceError;
use crate::logic::load_position;
use crate::network::protocol::MoveRequest;
use crate::network::MoveService;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use shakmaty::uci::UciMove;
use shakmaty::Position;

/// Plays a uniformly random legal move; stands in for the remote service
/// when running without one. Difficulty is ignored.
#[derive(Debug, Default)]
pub struct RandomMoveService;

impl RandomMoveService {
    pub fn new() -> Self {
        RandomMoveService
    }
}

#[async_trait]
impl MoveService for RandomMoveService {
    async fn request_move(&self, request: &MoveRequest) -> Result<String, ServiceError> {
        let position =
            load_position(&request.fen).map_err(|e| ServiceError::Malformed(e.to_string()))?;
        let legal = position.legal_moves();
        let mut rng = rand::thread_rng();
        legal
            .choose(&mut rng)
            .map(|m| UciMove::from_standard(*m).to_string())
            .ok_or(ServiceError::MissingMove)
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        Ok(())
    }
}
