use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use deck_keeper_core::{Card, DeckError, DeckId, DeckView, DrawOutcome, DrawnCard};

use crate::engine::DeckEngine;
use crate::store::DeckStore;

type Reply<T> = oneshot::Sender<Result<T, DeckError>>;

/// 发给牌组工作任务的指令
///
/// 每条指令自带一个回复通道，结果只会发回给提交它的调用方。
enum DeckCommand {
    Create { packs: u32, jokers: bool, reply: Reply<DeckView> },
    Draw { id: DeckId, count: usize, reply: Reply<DrawOutcome> },
    Shuffle { id: DeckId, reply: Reply<DeckView> },
    AddCards { id: DeckId, codes: String, reply: Reply<DeckView> },
    ShowDrawn { id: DeckId, count: String, reply: Reply<Vec<DrawnCard>> },
    ShowUpcoming { id: DeckId, count: String, reply: Reply<Vec<Card>> },
}

/// 牌组服务的句柄
///
/// 所有操作 (包括只读的查看) 都进入同一个队列，
/// 由唯一的工作任务按到达顺序逐个执行。引擎只归这个任务所有，
/// 因此任何操作都看不到另一个操作写到一半的状态。
#[derive(Clone)]
pub struct DeckService {
    sender: mpsc::Sender<DeckCommand>,
}

impl DeckService {
    /// 启动工作任务并返回句柄，所有句柄都被丢弃后工作任务退出
    pub fn spawn<S>(engine: DeckEngine<S>, queue_depth: usize) -> Self
    where
        S: DeckStore + 'static,
    {
        let (sender, receiver) = mpsc::channel(queue_depth.max(1));
        tokio::spawn(run_worker(engine, receiver));
        Self { sender }
    }

    pub async fn create(&self, packs: u32, jokers: bool) -> Result<DeckView, DeckError> {
        self.submit(|reply| DeckCommand::Create { packs, jokers, reply }).await
    }

    pub async fn draw(&self, id: DeckId, count: usize) -> Result<DrawOutcome, DeckError> {
        self.submit(|reply| DeckCommand::Draw { id, count, reply }).await
    }

    pub async fn shuffle(&self, id: DeckId) -> Result<DeckView, DeckError> {
        self.submit(|reply| DeckCommand::Shuffle { id, reply }).await
    }

    pub async fn add_cards(&self, id: DeckId, codes: String) -> Result<DeckView, DeckError> {
        self.submit(|reply| DeckCommand::AddCards { id, codes, reply }).await
    }

    /// `count` 是未解析的原始参数，在确认牌组存在之后才解析
    pub async fn show_drawn(&self, id: DeckId, count: String) -> Result<Vec<DrawnCard>, DeckError> {
        self.submit(|reply| DeckCommand::ShowDrawn { id, count, reply }).await
    }

    pub async fn show_upcoming(&self, id: DeckId, count: String) -> Result<Vec<Card>, DeckError> {
        self.submit(|reply| DeckCommand::ShowUpcoming { id, count, reply }).await
    }

    /// 提交指令并等待结果，没有超时，排到为止
    async fn submit<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> DeckCommand,
    ) -> Result<T, DeckError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(command(reply))
            .await
            .map_err(|_| unavailable())?;
        response.await.map_err(|_| unavailable())?
    }
}

fn unavailable() -> DeckError {
    DeckError::StoreFailure("deck service unavailable".to_string())
}

/// 工作任务：一次只执行一条指令
async fn run_worker<S: DeckStore>(engine: DeckEngine<S>, mut receiver: mpsc::Receiver<DeckCommand>) {
    info!("牌组工作任务已启动");
    while let Some(command) = receiver.recv().await {
        apply(&engine, command).await;
    }
    info!("牌组工作任务已退出");
}

async fn apply<S: DeckStore>(engine: &DeckEngine<S>, command: DeckCommand) {
    match command {
        DeckCommand::Create { packs, jokers, reply } => {
            respond(reply, engine.create(packs, jokers).await);
        }
        DeckCommand::Draw { id, count, reply } => {
            respond(reply, engine.draw(id, count).await);
        }
        DeckCommand::Shuffle { id, reply } => {
            respond(reply, engine.shuffle(id).await);
        }
        DeckCommand::AddCards { id, codes, reply } => {
            respond(reply, engine.add_cards(id, &codes).await);
        }
        DeckCommand::ShowDrawn { id, count, reply } => {
            respond(reply, engine.show_drawn(id, &count).await);
        }
        DeckCommand::ShowUpcoming { id, count, reply } => {
            respond(reply, engine.show_upcoming(id, &count).await);
        }
    }
}

fn respond<T>(reply: Reply<T>, result: Result<T, DeckError>) {
    if let Err(DeckError::StoreFailure(message)) = &result {
        warn!("存储操作失败: {}", message);
    }
    if reply.send(result).is_err() {
        // 调用方已经放弃等待，操作本身已经完成
        debug!("调用方已断开，丢弃结果");
    }
}
