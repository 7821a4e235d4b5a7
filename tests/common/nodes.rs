#![allow(dead_code)]

use async_trait::async_trait;
use dagflow::node::{Node, NodeError};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Passes its input through unchanged.
#[derive(Debug, Clone)]
pub struct EchoNode;

#[async_trait]
impl Node for EchoNode {
    async fn run(&self, input: Value) -> Result<Value, NodeError> {
        Ok(input)
    }
}

/// Reads `key` from the input mapping and adds `delta`.
#[derive(Debug, Clone)]
pub struct AddNode {
    pub key: &'static str,
    pub delta: i64,
}

impl AddNode {
    pub fn new(key: &'static str, delta: i64) -> Self {
        Self { key, delta }
    }
}

#[async_trait]
impl Node for AddNode {
    async fn run(&self, input: Value) -> Result<Value, NodeError> {
        let n = input[self.key]
            .as_i64()
            .ok_or(NodeError::MissingInput { what: self.key })?;
        Ok(json!(n + self.delta))
    }
}

/// Multiplies the values found under `left` and `right`.
#[derive(Debug, Clone)]
pub struct MulNode {
    pub left: &'static str,
    pub right: &'static str,
    pub factor: i64,
}

impl MulNode {
    pub fn new(left: &'static str, right: &'static str) -> Self {
        Self {
            left,
            right,
            factor: 1,
        }
    }

    pub fn with_factor(mut self, factor: i64) -> Self {
        self.factor = factor;
        self
    }
}

#[async_trait]
impl Node for MulNode {
    async fn run(&self, input: Value) -> Result<Value, NodeError> {
        let left = input[self.left]
            .as_i64()
            .ok_or(NodeError::MissingInput { what: self.left })?;
        let right = input[self.right]
            .as_i64()
            .ok_or(NodeError::MissingInput { what: self.right })?;
        Ok(json!(self.factor * left * right))
    }
}

/// [`AddNode`] that sleeps before producing, for parallelism timing tests.
#[derive(Debug, Clone)]
pub struct SlowAddNode {
    pub key: &'static str,
    pub delta: i64,
    pub delay: Duration,
}

impl SlowAddNode {
    pub fn new(key: &'static str, delta: i64, delay: Duration) -> Self {
        Self { key, delta, delay }
    }
}

#[async_trait]
impl Node for SlowAddNode {
    async fn run(&self, input: Value) -> Result<Value, NodeError> {
        tokio::time::sleep(self.delay).await;
        let n = input[self.key]
            .as_i64()
            .ok_or(NodeError::MissingInput { what: self.key })?;
        Ok(json!(n + self.delta))
    }
}

/// Fails with a fixed message.
#[derive(Debug, Clone)]
pub struct FailingNode {
    pub message: &'static str,
}

impl FailingNode {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}

#[async_trait]
impl Node for FailingNode {
    async fn run(&self, _input: Value) -> Result<Value, NodeError> {
        Err(NodeError::msg(self.message))
    }
}

/// Counts its invocations, then echoes its input.
#[derive(Debug, Clone)]
pub struct CountingNode {
    pub invocations: Arc<AtomicUsize>,
}

impl CountingNode {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let invocations = Arc::new(AtomicUsize::new(0));
        (
            Self {
                invocations: invocations.clone(),
            },
            invocations,
        )
    }
}

#[async_trait]
impl Node for CountingNode {
    async fn run(&self, input: Value) -> Result<Value, NodeError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        Ok(input)
    }
}

/// Sleeps, then raises an external flag. For dangling-branch tests.
#[derive(Debug, Clone)]
pub struct FlagNode {
    pub flag: Arc<AtomicBool>,
    pub delay: Duration,
}

impl FlagNode {
    pub fn new(delay: Duration) -> (Self, Arc<AtomicBool>) {
        let flag = Arc::new(AtomicBool::new(false));
        (
            Self {
                flag: flag.clone(),
                delay,
            },
            flag,
        )
    }
}

#[async_trait]
impl Node for FlagNode {
    async fn run(&self, _input: Value) -> Result<Value, NodeError> {
        tokio::time::sleep(self.delay).await;
        self.flag.store(true, Ordering::SeqCst);
        Ok(Value::Null)
    }
}
