use proxygen_runtime::{MethodCall, ProxyHandler, argument, proxy_for, with_proxy};
use std::any::Any;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

static CALL_LOG: Mutex<Vec<String>> = Mutex::new(Vec::new());

/// Names of every call [`RecordingHandler`] has seen, oldest first
pub fn recorded_calls() -> Vec<String> {
    CALL_LOG.lock().map(|log| log.clone()).unwrap_or_default()
}

pub trait Vector {
    fn get_x(&self) -> f64;
    fn get_y(&self) -> f64;
    fn set_y(&mut self, y: f64);
    fn length(&self) -> f64;
}

/// Every `Vector` proxy is the fixed vector (3, 4)
#[proxy_for(Vector)]
pub fn vector_proxy(call: &MethodCall, args: Vec<Box<dyn Any>>) -> Box<dyn Any> {
    match call.name() {
        "getX" => Box::new(3.0_f64),
        "getY" => Box::new(4.0_f64),
        "length" => Box::new(5.0_f64),
        "setY" => {
            record_set_y(&args);
            Box::new(())
        }
        _ => Box::new(()),
    }
}

fn record_set_y(args: &[Box<dyn Any>]) {
    if let (Some(y), Ok(mut log)) = (argument::<f64>(args, 0), CALL_LOG.lock()) {
        log.push(format!("setY({y})"));
    }
}

pub trait Named {
    fn get_name(&self) -> Option<String>;
}

#[with_proxy(RecordingHandler)]
pub trait Vector1: Named {
    fn get_x(&self) -> f64;
    fn scale(&self, factor: f64) -> f64;
}

#[derive(Debug, Default)]
pub struct RecordingHandler {
    handled: AtomicUsize,
}

impl ProxyHandler for RecordingHandler {
    fn handle(&self, call: &MethodCall, args: Vec<Box<dyn Any>>) -> Box<dyn Any> {
        let count = self.handled.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut log) = CALL_LOG.lock() {
            log.push(call.name().to_string());
        }
        match call.name() {
            "getX" => Box::new(1.5_f64),
            "getName" => Box::new(Some(format!("vector1 #{count}"))),
            "scale" => {
                let factor = argument::<f64>(&args, 0).copied().unwrap_or(1.0);
                Box::new(1.5 * factor)
            }
            _ => Box::new(()),
        }
    }
}

#[with_proxy(EchoHandler)]
pub trait Greeter {
    fn greet(&self, name: String) -> String;
    fn reset(&mut self);
}

pub struct EchoHandler;

impl ProxyHandler for EchoHandler {
    fn handle(&self, call: &MethodCall, args: Vec<Box<dyn Any>>) -> Box<dyn Any> {
        match argument::<String>(&args, 0) {
            Some(name) => Box::new(format!("{}, {name}!", call.name())),
            None => Box::new(()),
        }
    }
}

#[with_proxy(TallyHandler)]
pub trait Tally {
    fn bump(&self, by: u32) -> u32;
}

/// Shared by every `Tally` proxy
pub struct TallyHandler {
    total: AtomicU32,
}

#[allow(clippy::new_without_default)]
impl TallyHandler {
    pub fn new() -> Self {
        TallyHandler {
            total: AtomicU32::new(0),
        }
    }
}

impl ProxyHandler for TallyHandler {
    fn handle(&self, _call: &MethodCall, args: Vec<Box<dyn Any>>) -> Box<dyn Any> {
        let by = argument::<u32>(&args, 0).copied().unwrap_or(0);
        Box::new(self.total.fetch_add(by, Ordering::SeqCst) + by)
    }
}
