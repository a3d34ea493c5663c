//! Batches of store calls.
//!
//! Every builder method validates its arguments, appends one or more
//! primitive calls and, where the reply must be written back into caller
//! memory, a continuation. Nothing is sent until the batch is run through a
//! [`Runner`](crate::Runner); the continuations then run in call order
//! against their own replies.
//!
//! A builder method that fails appends nothing, so a batch never holds a
//! partial structured operation.

mod scan;

use std::collections::HashSet;
use std::ops::Range;

use tablekv_common::types::{Key, KeyValue, Kind, Value};
use tablekv_store::{Request, Response, Sender};
use tracing::{debug, trace};

use crate::error::{ClientError, ClientResult};
use crate::model::{encode_column_key, ModelRegistry};
use crate::record::Record;

type Continuation<'a> = Box<dyn FnOnce(&[Response]) -> ClientResult<()> + 'a>;

/// The outcome of one builder call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpResult {
    /// Pairs touched by the operation, in call order.
    ///
    /// Reads report the value found, writes the value written, increments
    /// the new value, scans every pair returned and deletes the key with no
    /// value.
    pub rows: Vec<KeyValue>,
}

struct Op<'a> {
    calls: Range<usize>,
    post: Option<Continuation<'a>>,
}

/// A set of operations sent to the store in one round trip.
///
/// Records passed to [`get_struct`](Batch::get_struct),
/// [`inc_struct`](Batch::inc_struct) and [`scan_struct`](Batch::scan_struct)
/// stay borrowed until the batch is dropped or turned into its results.
pub struct Batch<'a> {
    registry: &'a ModelRegistry,
    calls: Vec<Request>,
    ops: Vec<Op<'a>>,
    results: Vec<OpResult>,
    submitted: bool,
}

impl<'a> Batch<'a> {
    pub(crate) fn new(registry: &'a ModelRegistry) -> Self {
        Self {
            registry,
            calls: Vec::new(),
            ops: Vec::new(),
            results: Vec::new(),
            submitted: false,
        }
    }

    /// Returns the number of primitive calls.
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Returns true if no calls were added.
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Returns the number of builder calls.
    pub fn op_count(&self) -> usize {
        self.ops.len()
    }

    /// Returns the primitive calls in order.
    pub fn calls(&self) -> &[Request] {
        &self.calls
    }

    /// Returns true once the batch has been run.
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Returns one result per builder call, available after a run.
    pub fn results(&self) -> &[OpResult] {
        &self.results
    }

    /// Releases the borrowed records and returns the results.
    pub fn into_results(self) -> Vec<OpResult> {
        self.results
    }

    fn push(&mut self, calls: Vec<Request>, post: Option<Continuation<'a>>) {
        let start = self.calls.len();
        self.calls.extend(calls);
        self.ops.push(Op {
            calls: start..self.calls.len(),
            post,
        });
    }

    /// Reads `columns` of the row identified by the primary key of `record`
    /// into `record`. An empty column list reads every non-key column.
    ///
    /// Columns with no stored value are reset to their zero value.
    pub fn get_struct<R: Record>(&mut self, record: &'a mut R, columns: &[&str]) -> ClientResult<()> {
        let model = self.registry.lookup::<R>()?;
        let primary_key = model.encode_primary_key(record)?;
        let fields = model.resolve(columns)?;

        let calls = fields
            .iter()
            .map(|&i| {
                let key = encode_column_key(&primary_key, model.field_at(i).name());
                trace!(key = %key, "Get");
                Request::Get { key }
            })
            .collect();

        self.push(
            calls,
            Some(Box::new(move |replies: &[Response]| {
                for (&i, reply) in fields.iter().zip(replies) {
                    let value = match reply {
                        Response::Get(value) => value.as_ref(),
                        other => return Err(unexpected("Get", other)),
                    };
                    model.field_at(i).set_value(record, value)?;
                }
                Ok(())
            })),
        );
        Ok(())
    }

    /// Writes `columns` of `record` to its row. An empty column list writes
    /// every non-key column.
    pub fn put_struct<R: Record>(&mut self, record: &R, columns: &[&str]) -> ClientResult<()> {
        let model = self.registry.lookup::<R>()?;
        let primary_key = model.encode_primary_key(record)?;
        let fields = model.resolve(columns)?;

        let mut calls = Vec::with_capacity(fields.len());
        for i in fields {
            let field = model.field_at(i);
            let key = encode_column_key(&primary_key, field.name());
            let value = field.get_value(record)?;
            trace!(key = %key, value = %value, "Put");
            calls.push(Request::Put { key, value });
        }

        self.push(calls, None);
        Ok(())
    }

    /// Adds `delta` to `column` of the row identified by `record` and stores
    /// the new value in `record`. The column must be an integer field.
    pub fn inc_struct<R: Record>(&mut self, record: &'a mut R, delta: i64, column: &str) -> ClientResult<()> {
        let model = self.registry.lookup::<R>()?;
        let primary_key = model.encode_primary_key(record)?;
        let kind = model.field(column)?.kind();
        if !matches!(kind, Kind::Int | Kind::Uint) {
            return Err(ClientError::NotIncrementable {
                table: model.name().to_string(),
                column: column.to_string(),
                kind,
            });
        }

        let key = encode_column_key(&primary_key, column);
        trace!(key = %key, delta, "Inc");
        let column = column.to_string();

        self.push(
            vec![Request::Increment { key, delta }],
            Some(Box::new(move |replies: &[Response]| match replies {
                [Response::Increment(value)] => model
                    .field(&column)?
                    .set_value(record, Some(&Value::Integer(*value))),
                [other] => Err(unexpected("Increment", other)),
                _ => Err(ClientError::UnexpectedResponse(format!(
                    "{} replies to one Increment",
                    replies.len()
                ))),
            })),
        );
        Ok(())
    }

    /// Scans the rows with primary keys in `[start, end)` and appends them
    /// to `dest` in key order.
    ///
    /// `max_rows` bounds the number of column pairs read (`0` is
    /// unlimited), so the last record may be partially populated. A
    /// non-empty column list restricts the fields set on each record; the
    /// primary key fields are always set. `dest` is only extended if every
    /// pair decodes.
    pub fn scan_struct<R: Record>(
        &mut self,
        dest: &'a mut Vec<R>,
        start: &R,
        end: &R,
        max_rows: usize,
        columns: &[&str],
    ) -> ClientResult<()> {
        let model = self.registry.lookup::<R>()?;
        let start_key = model.encode_primary_key(start)?;
        let end_key = model.encode_primary_key(end)?;

        let filter = if columns.is_empty() {
            None
        } else {
            model.resolve(columns)?;
            Some(columns.iter().map(|c| c.to_string()).collect::<HashSet<_>>())
        };
        trace!(start = %start_key, end = %end_key, max_rows, "Scan");

        self.push(
            vec![Request::Scan {
                start: start_key,
                end: end_key,
                max_rows,
            }],
            Some(Box::new(move |replies: &[Response]| match replies {
                [Response::Scan(pairs)] => {
                    let records = scan::reconstruct(&model, pairs, filter.as_ref())?;
                    dest.extend(records);
                    Ok(())
                }
                [other] => Err(unexpected("Scan", other)),
                _ => Err(ClientError::UnexpectedResponse(format!(
                    "{} replies to one Scan",
                    replies.len()
                ))),
            })),
        );
        Ok(())
    }

    /// Deletes `columns` of the row identified by `record`. An empty column
    /// list deletes every non-key column, which removes the row.
    pub fn del_struct<R: Record>(&mut self, record: &R, columns: &[&str]) -> ClientResult<()> {
        let model = self.registry.lookup::<R>()?;
        let primary_key = model.encode_primary_key(record)?;
        let fields = model.resolve(columns)?;

        let calls = fields
            .iter()
            .map(|&i| {
                let key = encode_column_key(&primary_key, model.field_at(i).name());
                trace!(key = %key, "Del");
                Request::Delete { key }
            })
            .collect();

        self.push(calls, None);
        Ok(())
    }

    /// Reads `key`.
    pub fn get(&mut self, key: impl Into<Key>) -> ClientResult<()> {
        let key = key.into();
        trace!(key = %key, "Get");
        self.push(vec![Request::Get { key }], None);
        Ok(())
    }

    /// Writes `value` at `key`.
    pub fn put(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> ClientResult<()> {
        let (key, value) = (key.into(), value.into());
        trace!(key = %key, value = %value, "Put");
        self.push(vec![Request::Put { key, value }], None);
        Ok(())
    }

    /// Writes `value` at `key` if the current value equals `expected`
    /// (`None` requires the key to be absent).
    pub fn cput(
        &mut self,
        key: impl Into<Key>,
        value: impl Into<Value>,
        expected: Option<Value>,
    ) -> ClientResult<()> {
        let (key, value) = (key.into(), value.into());
        trace!(key = %key, value = %value, ?expected, "CPut");
        self.push(
            vec![Request::ConditionalPut {
                key,
                value,
                expected,
            }],
            None,
        );
        Ok(())
    }

    /// Adds `delta` to the integer at `key`.
    pub fn inc(&mut self, key: impl Into<Key>, delta: i64) -> ClientResult<()> {
        let key = key.into();
        trace!(key = %key, delta, "Inc");
        self.push(vec![Request::Increment { key, delta }], None);
        Ok(())
    }

    /// Reads the pairs in `[start, end)`, at most `max_rows` (`0` is
    /// unlimited).
    pub fn scan(&mut self, start: impl Into<Key>, end: impl Into<Key>, max_rows: usize) -> ClientResult<()> {
        let (start, end) = (start.into(), end.into());
        trace!(start = %start, end = %end, max_rows, "Scan");
        self.push(
            vec![Request::Scan {
                start,
                end,
                max_rows,
            }],
            None,
        );
        Ok(())
    }

    /// Deletes `key`.
    pub fn del(&mut self, key: impl Into<Key>) -> ClientResult<()> {
        let key = key.into();
        trace!(key = %key, "Del");
        self.push(vec![Request::Delete { key }], None);
        Ok(())
    }

    /// Sends every call through `sender` and runs the continuations.
    ///
    /// Every continuation runs even if an earlier one failed; the first
    /// error is returned.
    pub(crate) fn submit<S: Sender + ?Sized>(&mut self, sender: &S, max_calls: Option<usize>) -> ClientResult<()> {
        if self.submitted {
            return Err(ClientError::BatchSubmitted);
        }
        if let Some(max) = max_calls {
            if self.calls.len() > max {
                return Err(ClientError::BatchTooLarge {
                    calls: self.calls.len(),
                    max,
                });
            }
        }
        self.submitted = true;

        debug!(calls = self.calls.len(), ops = self.ops.len(), "submitting batch");
        let replies = if self.calls.is_empty() {
            Vec::new()
        } else {
            sender.send(&self.calls)?
        };
        if replies.len() != self.calls.len() {
            return Err(ClientError::UnexpectedResponse(format!(
                "{} replies to {} calls",
                replies.len(),
                self.calls.len()
            )));
        }

        let mut first_err = None;
        for op in &mut self.ops {
            let requests = &self.calls[op.calls.clone()];
            let replies = &replies[op.calls.clone()];

            let mut rows = Vec::new();
            for (request, reply) in requests.iter().zip(replies) {
                match result_rows(request, reply) {
                    Ok(pairs) => rows.extend(pairs),
                    Err(err) => {
                        first_err.get_or_insert(err);
                    }
                }
            }
            self.results.push(OpResult { rows });

            if let Some(post) = op.post.take() {
                if let Err(err) = post(replies) {
                    first_err.get_or_insert(err);
                }
            }
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for Batch<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Batch")
            .field("calls", &self.calls)
            .field("ops", &self.ops.len())
            .field("submitted", &self.submitted)
            .finish()
    }
}

fn unexpected(expected: &str, reply: &Response) -> ClientError {
    ClientError::UnexpectedResponse(format!("{} reply to {expected}", reply.method()))
}

fn result_rows(request: &Request, reply: &Response) -> ClientResult<Vec<KeyValue>> {
    let rows = match (request, reply) {
        (Request::Get { key }, Response::Get(value)) => vec![KeyValue::new(key.clone(), value.clone())],
        (Request::Put { key, value }, Response::Put)
        | (Request::ConditionalPut { key, value, .. }, Response::ConditionalPut) => {
            vec![KeyValue::new(key.clone(), Some(value.clone()))]
        }
        (Request::Increment { key, .. }, Response::Increment(value)) => {
            vec![KeyValue::new(key.clone(), Some(Value::Integer(*value)))]
        }
        (Request::Scan { .. }, Response::Scan(pairs)) => pairs.clone(),
        (Request::Delete { key }, Response::Delete) => vec![KeyValue::new(key.clone(), None)],
        (request, reply) => return Err(unexpected(request.method(), reply)),
    };
    Ok(rows)
}
