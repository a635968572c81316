//! The statement execution seam.
//!
//! Connections and pooling belong to the transport. The datasource only hands
//! it SQL text and bound values.

use futures::future::BoxFuture;

use crate::error::Result;
use crate::value::{Record, Value};

/// What a driver returns after a write.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteAck {
    /// The driver echoed the written rows.
    Rows(Vec<Record>),
    /// The driver only reported how many rows were affected.
    Affected(u64),
}

/// Executes statements on behalf of the datasource.
pub trait Transport: Send + Sync {
    /// Runs a statement whose payload is an acknowledgment (DDL, INSERT).
    fn run_statement(&self, sql: String, values: Vec<Value>) -> BoxFuture<'_, Result<WriteAck>>;

    /// Runs a statement expected to return rows.
    fn run_query(&self, sql: String, values: Vec<Value>) -> BoxFuture<'_, Result<Vec<Record>>>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! A scripted transport that records every statement it receives.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use futures::FutureExt;

    use super::*;
    use crate::error::DatasourceError;

    /// Scripted response for one call.
    pub enum Reply {
        Ack(WriteAck),
        Rows(Vec<Record>),
        Fail(String),
    }

    #[derive(Default)]
    pub struct MockTransport {
        pub statements: Mutex<Vec<(String, Vec<Value>)>>,
        replies: Mutex<VecDeque<Reply>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queues replies consumed in call order. Unscripted calls succeed
        /// with `Affected(0)` or an empty row set.
        pub fn with_replies(replies: Vec<Reply>) -> Self {
            Self {
                statements: Mutex::new(Vec::new()),
                replies: Mutex::new(replies.into()),
            }
        }

        pub fn sql(&self) -> Vec<String> {
            self.statements
                .lock()
                .unwrap()
                .iter()
                .map(|(sql, _)| sql.clone())
                .collect()
        }

        fn record(&self, sql: String, values: Vec<Value>) -> Option<Reply> {
            self.statements.lock().unwrap().push((sql, values));
            self.replies.lock().unwrap().pop_front()
        }
    }

    impl Transport for MockTransport {
        fn run_statement(
            &self,
            sql: String,
            values: Vec<Value>,
        ) -> BoxFuture<'_, Result<WriteAck>> {
            let reply = self.record(sql, values);
            async move {
                match reply {
                    None => Ok(WriteAck::Affected(0)),
                    Some(Reply::Ack(ack)) => Ok(ack),
                    Some(Reply::Rows(rows)) => Ok(WriteAck::Rows(rows)),
                    Some(Reply::Fail(msg)) => Err(DatasourceError::Connectivity(msg)),
                }
            }
            .boxed()
        }

        fn run_query(&self, sql: String, values: Vec<Value>) -> BoxFuture<'_, Result<Vec<Record>>> {
            let reply = self.record(sql, values);
            async move {
                match reply {
                    None | Some(Reply::Ack(_)) => Ok(Vec::new()),
                    Some(Reply::Rows(rows)) => Ok(rows),
                    Some(Reply::Fail(msg)) => Err(DatasourceError::Connectivity(msg)),
                }
            }
            .boxed()
        }
    }

    /// Builds a record from `(field, text)` pairs.
    pub fn text_record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), Value::Text((*v).to_string())))
            .collect()
    }
}
