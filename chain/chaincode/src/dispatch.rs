//! Operation dispatcher
//!
//! Maps a function name and its string arguments onto the registry and the
//! lifecycle. Argument counts are checked before any state is touched.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info, info_span};
use uuid::Uuid;
use will_types::errors::CodecError;

use crate::config::ChaincodeConfig;
use crate::errors::ChaincodeError;
use crate::events::{EventRecord, LedgerEvent};
use crate::lifecycle::WillLifecycle;
use crate::registry::AccountRegistry;
use crate::security::CredentialVerifier;
use crate::store::KvStore;

/// Response payload of a successful unlock.
pub const UNLOCK_RESPONSE: &[u8] = b"successfully Unlocked";

/// Named chaincode operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Init,
    Write,
    Read,
    AddUser,
    ReadUserName,
    CreateWillPaper,
    UnlockTheWillByAdmin,
    CheckReplicas,
    RepairReplicas,
}

impl Operation {
    pub const ALL: [Operation; 9] = [
        Operation::Init,
        Operation::Write,
        Operation::Read,
        Operation::AddUser,
        Operation::ReadUserName,
        Operation::CreateWillPaper,
        Operation::UnlockTheWillByAdmin,
        Operation::CheckReplicas,
        Operation::RepairReplicas,
    ];

    /// Function name on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Init => "init",
            Operation::Write => "write",
            Operation::Read => "read",
            Operation::AddUser => "adduser",
            Operation::ReadUserName => "readusername",
            Operation::CreateWillPaper => "createwillpaper",
            Operation::UnlockTheWillByAdmin => "unlockthewillbyadmin",
            Operation::CheckReplicas => "checkreplicas",
            Operation::RepairReplicas => "repairreplicas",
        }
    }

    /// Exact number of arguments required.
    pub fn arity(&self) -> usize {
        match self {
            Operation::CheckReplicas => 0,
            Operation::Init | Operation::Read | Operation::ReadUserName => 1,
            Operation::Write | Operation::RepairReplicas => 2,
            Operation::CreateWillPaper | Operation::UnlockTheWillByAdmin => 3,
            Operation::AddUser => 4,
        }
    }

    /// Read-only operations, the only ones accepted by `query`.
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Operation::Read | Operation::ReadUserName | Operation::CheckReplicas
        )
    }

    fn check_arity<A: AsRef<str>>(&self, args: &[A]) -> Result<(), ChaincodeError> {
        if args.len() != self.arity() {
            return Err(ChaincodeError::InvalidArgumentCount {
                operation: self.name().to_string(),
                expected: self.arity(),
                actual: args.len(),
            });
        }
        Ok(())
    }
}

impl FromStr for Operation {
    type Err = ChaincodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| ChaincodeError::UnknownOperation {
                function: s.to_string(),
            })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The will register chaincode.
///
/// Holds the shared store, the account registry, the will lifecycle and the
/// append-only log of emitted events. The log is never trimmed here; callers
/// are expected to consume it with `drain_events` after handling each batch
/// of invocations.
pub struct Chaincode<S: KvStore> {
    store: Arc<S>,
    config: Arc<ChaincodeConfig>,
    registry: AccountRegistry<S>,
    lifecycle: WillLifecycle<S>,
    events: Mutex<Vec<EventRecord>>,
}

impl<S: KvStore> Chaincode<S> {
    /// Create a chaincode whose administrator check uses the configured pair.
    pub fn new(store: Arc<S>, config: ChaincodeConfig) -> Self {
        let config = Arc::new(config);
        let lifecycle = WillLifecycle::new(store.clone(), config.clone());
        Self::assemble(store, config, lifecycle)
    }

    /// Create a chaincode with a custom administrator check.
    pub fn with_verifier(
        store: Arc<S>,
        config: ChaincodeConfig,
        verifier: Box<dyn CredentialVerifier>,
    ) -> Self {
        let config = Arc::new(config);
        let lifecycle = WillLifecycle::with_verifier(store.clone(), config.clone(), verifier);
        Self::assemble(store, config, lifecycle)
    }

    fn assemble(
        store: Arc<S>,
        config: Arc<ChaincodeConfig>,
        lifecycle: WillLifecycle<S>,
    ) -> Self {
        info!(
            register_key = %config.register_key,
            department_key = %config.department_key,
            "Chaincode initialized"
        );
        Self {
            registry: AccountRegistry::new(store.clone(), config.clone()),
            store,
            config,
            lifecycle,
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn registry(&self) -> &AccountRegistry<S> {
        &self.registry
    }

    pub fn lifecycle(&self) -> &WillLifecycle<S> {
        &self.lifecycle
    }

    pub fn config(&self) -> &ChaincodeConfig {
        &self.config
    }

    // ───────────────────────── Entry points ─────────────────────────

    /// Run any operation.
    pub fn invoke<A: AsRef<str>>(
        &self,
        function: &str,
        args: &[A],
    ) -> Result<Vec<u8>, ChaincodeError> {
        let operation = function.parse::<Operation>().map_err(|err| {
            error!(function, "Invoke did not find function");
            err
        })?;
        self.dispatch(operation, args)
    }

    /// Run a read-only operation. Mutating operations are unknown here.
    pub fn query<A: AsRef<str>>(
        &self,
        function: &str,
        args: &[A],
    ) -> Result<Vec<u8>, ChaincodeError> {
        match function.parse::<Operation>() {
            Ok(operation) if operation.is_query() => self.dispatch(operation, args),
            _ => {
                error!(function, "Query did not find function");
                Err(ChaincodeError::UnknownOperation {
                    function: function.to_string(),
                })
            }
        }
    }

    fn dispatch<A: AsRef<str>>(
        &self,
        operation: Operation,
        args: &[A],
    ) -> Result<Vec<u8>, ChaincodeError> {
        let tx_id = Uuid::now_v7();
        let span = info_span!("invoke", %tx_id, function = operation.name());
        let _entered = span.enter();

        operation.check_arity(args)?;
        let args: Vec<&str> = args.iter().map(|arg| arg.as_ref()).collect();
        debug!(args = args.len(), "Dispatching");

        let result = self.run(tx_id, operation, &args);
        if let Err(err) = &result {
            error!(error = %err, kind = ?err.kind(), "Operation failed");
        }
        result
    }

    fn run(
        &self,
        tx_id: Uuid,
        operation: Operation,
        args: &[&str],
    ) -> Result<Vec<u8>, ChaincodeError> {
        match operation {
            Operation::Init => {
                let event = self.lifecycle.seed(args[0].as_bytes())?;
                self.record(tx_id, event);
                Ok(Vec::new())
            }
            Operation::Write => {
                if let Some(event) = self.write(args[0], args[1].as_bytes())? {
                    self.record(tx_id, event);
                }
                Ok(Vec::new())
            }
            Operation::Read => self.read(args[0]),
            Operation::AddUser => {
                let event = self.registry.create(args[0], args[1], args[2], args[3])?;
                self.record(tx_id, event);
                Ok(Vec::new())
            }
            Operation::ReadUserName => Ok(self.registry.lookup_name(args[0])?.into_bytes()),
            Operation::CreateWillPaper => {
                let event = self.lifecycle.create_document(args[0], args[1], args[2])?;
                self.record(tx_id, event);
                Ok(Vec::new())
            }
            Operation::UnlockTheWillByAdmin => {
                let event = self.lifecycle.unlock_by_admin(args[0], args[1], args[2])?;
                self.record(tx_id, event);
                Ok(UNLOCK_RESPONSE.to_vec())
            }
            Operation::CheckReplicas => {
                let status = self.lifecycle.check_replicas()?;
                serde_json::to_vec(&status).map_err(|e| {
                    ChaincodeError::Decode(CodecError::Encode {
                        reason: e.to_string(),
                    })
                })
            }
            Operation::RepairReplicas => {
                let event = self.lifecycle.repair_replicas(args[0], args[1])?;
                self.record(tx_id, event);
                Ok(Vec::new())
            }
        }
    }

    // ───────────────────────── Passthrough ─────────────────────────

    /// A write to either replica key is applied to both, like `init`.
    fn write(&self, key: &str, value: &[u8]) -> Result<Option<LedgerEvent>, ChaincodeError> {
        if self.config.is_replica_key(key) {
            return self.lifecycle.seed(value).map(Some);
        }
        self.store.put(key, value)?;
        Ok(None)
    }

    fn read(&self, key: &str) -> Result<Vec<u8>, ChaincodeError> {
        self.store
            .get(key)?
            .ok_or_else(|| ChaincodeError::NotFound {
                key: key.to_string(),
            })
    }

    // ───────────────────────── Events ─────────────────────────

    fn record(&self, tx_id: Uuid, event: LedgerEvent) {
        debug!(event = event.label(), "Event recorded");
        self.lock_events().push(EventRecord::new(tx_id, event));
    }

    fn lock_events(&self) -> MutexGuard<'_, Vec<EventRecord>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of all emitted events.
    pub fn events(&self) -> Vec<EventRecord> {
        self.lock_events().clone()
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&self) -> Vec<EventRecord> {
        std::mem::take(&mut *self.lock_events())
    }
}
