// src/generate/mod.rs
//! Text generation boundary: a prompt goes in, raw model text comes out.

pub mod gemini;
pub mod prompts;

use anyhow::{anyhow, Result};
use std::collections::VecDeque;
use std::sync::Mutex;

/// System instruction plus user prompt for one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptContext {
    pub system: String,
    pub user: String,
}

#[async_trait::async_trait]
pub trait Generator: Send + Sync {
    /// Single-shot call; returns the raw response text.
    async fn generate(&self, prompt: &PromptContext) -> Result<String>;
    fn name(&self) -> &'static str;
}

/// Replays canned responses in order and records every prompt it received.
/// `Err` entries simulate a failed call; an exhausted script fails too.
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<PromptContext>>,
}

impl ScriptedGenerator {
    pub fn new<I>(script: I) -> Self
    where
        I: IntoIterator<Item = Result<String, String>>,
    {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every call succeeds with the given responses, in order.
    pub fn replying<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(responses.into_iter().map(|s| Ok(s.into())))
    }

    pub fn prompts(&self) -> Vec<PromptContext> {
        self.prompts.lock().expect("poisoned prompts").clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().expect("poisoned prompts").len()
    }
}

#[async_trait::async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, prompt: &PromptContext) -> Result<String> {
        self.prompts
            .lock()
            .expect("poisoned prompts")
            .push(prompt.clone());
        let next = self.script.lock().expect("poisoned script").pop_front();
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(e)) => Err(anyhow!(e)),
            None => Err(anyhow!("scripted generator exhausted")),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
