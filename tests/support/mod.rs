#![allow(dead_code)]

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use serde_json::{Map, Value, json};
use skinsight::analysis::{PARAMETER_NAMES, parse_analysis};
use skinsight::error::LlmError;
use skinsight::llm::{CompletionParams, Provider, ProviderMessage};
use skinsight::AnalysisResult;
use std::collections::VecDeque;
use std::future::Future;
use std::io::Cursor;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn png_base64(width: u32, height: u32) -> String {
    let img = RgbaImage::from_pixel(width, height, Rgba([205, 160, 140, 255]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    STANDARD.encode(out.into_inner())
}

/// A payload with every canonical parameter scored `value`.
pub fn payload(value: u8) -> Value {
    let mut object = Map::new();
    for name in PARAMETER_NAMES {
        object.insert(
            name.to_string(),
            json!({
                "value": value,
                "description": format!("{name} osservato"),
                "evaluation": "nella media",
                "advice": "continuare la routine attuale"
            }),
        );
    }
    Value::Object(object)
}

pub fn sentinel(value: u8) -> String {
    format!(
        "<attribute=analysis_result| {} | attribute=analysis_result>",
        payload(value)
    )
}

pub fn result(value: u8) -> AnalysisResult {
    parse_analysis(&sentinel(value)).unwrap()
}

/// Pops scripted replies in order; an empty script answers with prose.
pub struct MockProvider {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    calls: Arc<AtomicUsize>,
    seen: Mutex<Vec<Vec<ProviderMessage>>>,
}

impl MockProvider {
    pub fn new(replies: Vec<Result<String, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from(replies)),
            calls: Arc::new(AtomicUsize::new(0)),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn always(text: &str) -> Self {
        let provider = Self::new(Vec::new());
        provider.replies.lock().unwrap().extend(
            std::iter::repeat_with(|| Ok(text.to_string())).take(64),
        );
        provider
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<Vec<ProviderMessage>> {
        self.seen
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn complete<'a>(
        &'a self,
        messages: &'a [ProviderMessage],
        _params: &'a CompletionParams,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(messages.to_vec());
        let reply = self
            .replies
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Ok("Non riesco a valutare le immagini.".to_string()));
        Box::pin(async move { reply })
    }
}

pub fn params() -> CompletionParams {
    CompletionParams {
        model: "gpt-4o".into(),
        temperature: 0.25,
        max_tokens: 2048,
    }
}
