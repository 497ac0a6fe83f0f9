//! The `State` module owns the account and serializes every operation on it.
//!
//! A single task runs [`State::run`] and receives [`Command`]s from any number
//! of [`AtmHandle`]s. Each command carries a reply channel, so a balance change
//! and its ledger entry always happen together, one caller at a time.
use chrono::{Duration, Utc};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::bank::{
    Account, Money, SessionGate, SessionId, Transaction, TransactionError, Unauthorized,
};

/// Errors surfaced to callers of the ATM.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AtmError {
    #[error("PIN does not match")]
    AuthenticationFailed,
    #[error("Session is not authenticated")]
    Unauthorized,
    #[error(transparent)]
    Transaction(#[from] TransactionError),
    #[error("ATM is not running")]
    Unavailable,
}

impl From<Unauthorized> for AtmError {
    fn from(_: Unauthorized) -> Self {
        AtmError::Unauthorized
    }
}

type Reply<T> = oneshot::Sender<Result<T, AtmError>>;

/// Requests handled by the [`State`] task.
pub enum Command {
    Authenticate {
        session: SessionId,
        pin: String,
        reply: Reply<()>,
    },
    IsAuthenticated {
        session: SessionId,
        reply: oneshot::Sender<bool>,
    },
    Logout {
        session: SessionId,
        reply: oneshot::Sender<()>,
    },
    Balance {
        session: SessionId,
        reply: Reply<Money>,
    },
    Deposit {
        session: SessionId,
        amount: Money,
        reply: Reply<Money>,
    },
    Withdraw {
        session: SessionId,
        amount: Money,
        reply: Reply<Money>,
    },
    Statement {
        session: SessionId,
        reply: Reply<Vec<Transaction>>,
    },
}

/// Owns the account and the session gate in front of it.
pub struct State {
    account: Account,
    gate: SessionGate,
    /// A channel receiver for incoming commands.
    receiver: mpsc::Receiver<Command>,
}

impl State {
    pub fn new(account: Account, session_ttl: Duration, receiver: mpsc::Receiver<Command>) -> Self {
        State {
            account,
            gate: SessionGate::new(session_ttl),
            receiver,
        }
    }

    /// Gives the account back once the command loop is over.
    pub fn into_account(self) -> Account {
        self.account
    }

    fn authenticate(&mut self, session: SessionId, pin: &str) -> Result<(), AtmError> {
        if self.gate.authenticate(session, pin, &self.account, Utc::now()) {
            tracing::info!(%session, "session authenticated");
            Ok(())
        } else {
            tracing::warn!(%session, "authentication failed");
            Err(AtmError::AuthenticationFailed)
        }
    }

    fn balance(&mut self, session: &SessionId) -> Result<Money, AtmError> {
        self.gate.require(session, Utc::now())?;
        Ok(self.account.balance())
    }

    fn deposit(&mut self, session: &SessionId, amount: Money) -> Result<Money, AtmError> {
        let now = Utc::now();
        self.gate.require(session, now)?;
        let balance = self.account.deposit(amount, now)?;
        tracing::info!(%session, amount, balance, "deposit applied");
        Ok(balance)
    }

    fn withdraw(&mut self, session: &SessionId, amount: Money) -> Result<Money, AtmError> {
        let now = Utc::now();
        self.gate.require(session, now)?;
        let balance = self.account.withdraw(amount, now)?;
        tracing::info!(%session, amount, balance, "withdrawal applied");
        Ok(balance)
    }

    fn statement(&mut self, session: &SessionId) -> Result<Vec<Transaction>, AtmError> {
        self.gate.require(session, Utc::now())?;
        Ok(self.account.ledger().all().cloned().collect())
    }

    /// Processes one command and sends its reply. A caller that has gone away
    /// simply misses the answer.
    fn process_command(&mut self, command: Command) {
        match command {
            Command::Authenticate {
                session,
                pin,
                reply,
            } => {
                let _ = reply.send(self.authenticate(session, &pin));
            }
            Command::IsAuthenticated { session, reply } => {
                let _ = reply.send(self.gate.is_authenticated(&session, Utc::now()));
            }
            Command::Logout { session, reply } => {
                self.gate.logout(&session);
                tracing::info!(%session, "session closed");
                let _ = reply.send(());
            }
            Command::Balance { session, reply } => {
                let _ = reply.send(log_rejection(self.balance(&session)));
            }
            Command::Deposit {
                session,
                amount,
                reply,
            } => {
                let _ = reply.send(log_rejection(self.deposit(&session, amount)));
            }
            Command::Withdraw {
                session,
                amount,
                reply,
            } => {
                let _ = reply.send(log_rejection(self.withdraw(&session, amount)));
            }
            Command::Statement { session, reply } => {
                let _ = reply.send(log_rejection(self.statement(&session)));
            }
        }
    }

    /// Runs the command loop until every handle has been dropped.
    pub async fn run(&mut self) {
        tracing::info!(balance = self.account.balance(), "ATM started");
        while let Some(command) = self.receiver.recv().await {
            self.process_command(command);
        }
        if self.account.ledger().is_empty() {
            tracing::info!(balance = self.account.balance(), "ATM stopped with no transactions");
        } else {
            tracing::info!(
                balance = self.account.balance(),
                transactions = self.account.ledger().len(),
                "ATM stopped"
            );
        }
    }
}

fn log_rejection<T>(result: Result<T, AtmError>) -> Result<T, AtmError> {
    if let Err(err) = &result {
        tracing::debug!(%err, "request rejected");
    }
    result
}

/// Cloneable access to a running [`State`] task.
#[derive(Clone, Debug)]
pub struct AtmHandle {
    sender: mpsc::Sender<Command>,
}

impl AtmHandle {
    pub fn new(sender: mpsc::Sender<Command>) -> Self {
        AtmHandle { sender }
    }

    /// Starts the command loop for `account` on the current runtime.
    pub fn spawn(
        account: Account,
        session_ttl: Duration,
        channel_size: usize,
    ) -> (Self, tokio::task::JoinHandle<Account>) {
        let (sender, receiver) = mpsc::channel(channel_size);
        let mut state = State::new(account, session_ttl, receiver);
        let handle = tokio::spawn(async move {
            state.run().await;
            state.into_account()
        });
        (AtmHandle::new(sender), handle)
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, AtmError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(command(reply))
            .await
            .map_err(|_| AtmError::Unavailable)?;
        response.await.map_err(|_| AtmError::Unavailable)
    }

    /// Opens `session` if `pin` matches the account PIN.
    pub async fn authenticate(&self, session: SessionId, pin: impl Into<String>) -> Result<(), AtmError> {
        let pin = pin.into();
        self.request(|reply| Command::Authenticate {
            session,
            pin,
            reply,
        })
        .await?
    }

    pub async fn is_authenticated(&self, session: SessionId) -> Result<bool, AtmError> {
        self.request(|reply| Command::IsAuthenticated { session, reply })
            .await
    }

    pub async fn logout(&self, session: SessionId) -> Result<(), AtmError> {
        self.request(|reply| Command::Logout { session, reply }).await
    }

    pub async fn balance(&self, session: SessionId) -> Result<Money, AtmError> {
        self.request(|reply| Command::Balance { session, reply })
            .await?
    }

    /// Deposits `amount` and returns the new balance.
    pub async fn deposit(&self, session: SessionId, amount: Money) -> Result<Money, AtmError> {
        self.request(|reply| Command::Deposit {
            session,
            amount,
            reply,
        })
        .await?
    }

    /// Withdraws `amount` and returns the new balance.
    pub async fn withdraw(&self, session: SessionId, amount: Money) -> Result<Money, AtmError> {
        self.request(|reply| Command::Withdraw {
            session,
            amount,
            reply,
        })
        .await?
    }

    /// Snapshot of the ledger, oldest entry first.
    pub async fn statement(&self, session: SessionId) -> Result<Vec<Transaction>, AtmError> {
        self.request(|reply| Command::Statement { session, reply })
            .await?
    }
}
