/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use g3_cares::{
    AresChannel, AresChannelError, AresEngine, AresFlags, AresOptionMask, AresOptions,
    ChannelState, ConfigDirective, EngineStatus, InitStage, NativeOptions,
};

#[derive(Default)]
struct FakeEngine {
    fail_library_init: Option<i32>,
    fail_channel_init: Option<i32>,
    fail_servers: Option<i32>,
    fail_sortlist: Option<i32>,
    next_channel_id: AtomicUsize,
    events: Mutex<Vec<String>>,
    init_mask: Mutex<Option<AresOptionMask>>,
}

struct FakeChannel {
    id: usize,
    users: Arc<AtomicUsize>,
}

impl FakeEngine {
    fn record(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn count(&self, event: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.as_str() == event)
            .count()
    }

    /// Library inits minus cleanups, plus channel inits minus destroys.
    fn live_resources(&self) -> usize {
        let library = self.count("library_init") - self.count("library_cleanup");
        let channel = self.count("channel_init") - self.count("channel_destroy");
        library + channel
    }
}

fn fail_or_ok(code: Option<i32>) -> Result<(), EngineStatus> {
    match code {
        Some(code) => Err(EngineStatus::new(code)),
        None => Ok(()),
    }
}

impl AresEngine for FakeEngine {
    type Channel = FakeChannel;

    fn library_init(&self) -> Result<(), EngineStatus> {
        fail_or_ok(self.fail_library_init)?;
        self.record("library_init");
        Ok(())
    }

    fn library_cleanup(&self) {
        self.record("library_cleanup");
    }

    fn init_channel(
        &self,
        _options: &NativeOptions,
        mask: AresOptionMask,
    ) -> Result<FakeChannel, EngineStatus> {
        fail_or_ok(self.fail_channel_init)?;
        *self.init_mask.lock().unwrap() = Some(mask);
        self.record("channel_init");
        Ok(FakeChannel {
            id: self.next_channel_id.fetch_add(1, Ordering::Relaxed),
            users: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn set_servers_csv(
        &self,
        _channel: &mut FakeChannel,
        servers: &str,
    ) -> Result<(), EngineStatus> {
        fail_or_ok(self.fail_servers)?;
        self.record(format!("servers {servers}"));
        Ok(())
    }

    fn set_sortlist(&self, _channel: &mut FakeChannel, sortlist: &str) -> Result<(), EngineStatus> {
        fail_or_ok(self.fail_sortlist)?;
        self.record(format!("sortlist {sortlist}"));
        Ok(())
    }

    fn destroy_channel(&self, _channel: FakeChannel) {
        self.record("channel_destroy");
    }
}

fn full_options() -> AresOptions {
    let mut builder = AresOptions::builder();
    builder.add_server("1.1.1.1").unwrap();
    builder.add_server("8.8.8.8").unwrap();
    builder.add_sort_rule("10.0.0.0/8").unwrap();
    builder.add_sort_rule("192.168.0.0/16").unwrap();
    builder.set_flags(AresFlags::EDNS);
    builder.set_tries(2);
    builder.build().unwrap()
}

#[test]
fn create_and_drop() {
    let engine = Arc::new(FakeEngine::default());
    let channel = AresChannel::new(engine.clone(), &full_options()).unwrap();
    assert_eq!(channel.state(), ChannelState::Ready);
    assert_eq!(
        *engine.init_mask.lock().unwrap(),
        Some(AresOptionMask::FLAGS | AresOptionMask::TRIES)
    );
    drop(channel);

    assert_eq!(
        engine.events(),
        vec![
            "library_init",
            "channel_init",
            "servers 1.1.1.1,8.8.8.8",
            "sortlist 10.0.0.0/8 192.168.0.0/16",
            "channel_destroy",
            "library_cleanup",
        ]
    );
    assert_eq!(engine.live_resources(), 0);
}

#[test]
fn no_directive_without_list() {
    let engine = Arc::new(FakeEngine::default());
    let channel = AresChannel::new(engine.clone(), &AresOptions::default()).unwrap();
    drop(channel);
    assert_eq!(
        engine.events(),
        vec![
            "library_init",
            "channel_init",
            "channel_destroy",
            "library_cleanup"
        ]
    );
}

#[test]
fn empty_server_list_applied() {
    let mut builder = AresOptions::builder();
    builder.set_servers(Vec::<String>::new());
    let options = builder.build().unwrap();
    assert_eq!(options.servers_directive().as_deref(), Some(""));
    assert_eq!(options.sortlist_directive(), None);

    let engine = Arc::new(FakeEngine::default());
    let channel = AresChannel::new(engine.clone(), &options).unwrap();
    drop(channel);
    assert_eq!(
        engine.events(),
        vec![
            "library_init",
            "channel_init",
            "servers ",
            "channel_destroy",
            "library_cleanup"
        ]
    );
    assert_eq!(engine.count("servers "), 1);
    assert_eq!(engine.live_resources(), 0);
}

#[test]
fn library_init_failure() {
    let engine = Arc::new(FakeEngine {
        fail_library_init: Some(15),
        ..Default::default()
    });
    let e = AresChannel::new(engine.clone(), &full_options()).unwrap_err();
    assert_eq!(
        e,
        AresChannelError::EngineInit {
            stage: InitStage::Library,
            code: EngineStatus::ENOMEM,
        }
    );
    assert!(engine.events().is_empty());
}

#[test]
fn channel_init_failure() {
    let engine = Arc::new(FakeEngine {
        fail_channel_init: Some(14),
        ..Default::default()
    });
    let e = AresChannel::new(engine.clone(), &full_options()).unwrap_err();
    assert_eq!(e.get_type(), "EngineInitError");
    assert_eq!(e.code().code(), 14);
    assert_eq!(engine.events(), vec!["library_init", "library_cleanup"]);
    assert_eq!(engine.live_resources(), 0);
}

#[test]
fn servers_failure() {
    let engine = Arc::new(FakeEngine {
        fail_servers: Some(17),
        ..Default::default()
    });
    let e = AresChannel::new(engine.clone(), &full_options()).unwrap_err();
    assert_eq!(
        e,
        AresChannelError::EngineConfig {
            directive: ConfigDirective::Servers,
            code: EngineStatus::EBADSTR,
        }
    );
    assert_eq!(engine.count("channel_destroy"), 1);
    assert_eq!(engine.count("library_cleanup"), 1);
    assert_eq!(
        engine.events(),
        vec![
            "library_init",
            "channel_init",
            "channel_destroy",
            "library_cleanup"
        ]
    );
}

#[test]
fn sortlist_failure() {
    let engine = Arc::new(FakeEngine {
        fail_sortlist: Some(17),
        ..Default::default()
    });
    let e = AresChannel::new(engine.clone(), &full_options()).unwrap_err();
    assert_eq!(e.get_type(), "EngineConfigError");
    assert_eq!(engine.count("servers 1.1.1.1,8.8.8.8"), 1);
    assert_eq!(engine.count("channel_destroy"), 1);
    assert_eq!(engine.count("library_cleanup"), 1);
    assert_eq!(engine.live_resources(), 0);
}

#[test]
fn serialized_access() {
    const THREADS: usize = 8;

    let engine = Arc::new(FakeEngine::default());
    let channel = Arc::new(AresChannel::new(engine.clone(), &AresOptions::default()).unwrap());
    let log = Arc::new(Mutex::new(String::new()));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let channel = channel.clone();
            let log = log.clone();
            thread::spawn(move || {
                channel.with_channel(|c| {
                    let prev = c.users.fetch_add(1, Ordering::SeqCst);
                    assert_eq!(prev, 0);
                    for ch in format!("<{i}>").chars() {
                        log.lock().unwrap().push(ch);
                        thread::sleep(Duration::from_millis(1));
                    }
                    c.users.fetch_sub(1, Ordering::SeqCst);
                })
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let log = log.lock().unwrap();
    let mut entries: Vec<&str> = log
        .split_inclusive('>')
        .filter(|s| !s.is_empty())
        .collect();
    assert_eq!(entries.len(), THREADS);
    entries.sort();
    let mut expected: Vec<String> = (0..THREADS).map(|i| format!("<{i}>")).collect();
    expected.sort();
    assert_eq!(entries, expected);
}

#[test]
fn action_result_is_returned() {
    let engine = Arc::new(FakeEngine::default());
    let channel = AresChannel::new(engine, &AresOptions::default()).unwrap();

    let id = channel.with_channel(|c| c.id);
    assert_eq!(id, 0);

    let r: Result<(), String> = channel.with_channel(|_| Err("query failed".to_string()));
    assert_eq!(r, Err("query failed".to_string()));

    // the guard is released after a failed action
    assert_eq!(channel.with_channel(|c| c.id), 0);
}

#[test]
fn panic_in_action_releases_guard() {
    let engine = Arc::new(FakeEngine::default());
    let channel = AresChannel::new(engine.clone(), &AresOptions::default()).unwrap();

    let r = panic::catch_unwind(AssertUnwindSafe(|| {
        let _: () = channel.with_channel(|_| panic!("action failed"));
    }));
    assert!(r.is_err());

    assert_eq!(channel.state(), ChannelState::Ready);
    assert_eq!(channel.with_channel(|c| c.id), 0);
    drop(channel);
    assert_eq!(engine.live_resources(), 0);
}

#[test]
fn close_then_drop() {
    let engine = Arc::new(FakeEngine::default());
    let channel = AresChannel::new(engine.clone(), &AresOptions::default()).unwrap();

    channel.close();
    assert_eq!(channel.state(), ChannelState::Destroyed);
    assert_eq!(engine.count("channel_destroy"), 1);
    assert_eq!(engine.count("library_cleanup"), 0);

    channel.close();
    drop(channel);
    assert_eq!(engine.count("channel_destroy"), 1);
    assert_eq!(engine.count("library_cleanup"), 1);
}

#[test]
#[should_panic(expected = "used after destroyed")]
fn use_after_close() {
    let engine = Arc::new(FakeEngine::default());
    let channel = AresChannel::new(engine, &AresOptions::default()).unwrap();
    channel.close();
    channel.with_channel(|_| ());
}

#[test]
fn independent_channels() {
    let engine = Arc::new(FakeEngine::default());
    let first = AresChannel::new(engine.clone(), &AresOptions::default()).unwrap();
    let second = AresChannel::new(engine.clone(), &full_options()).unwrap();
    assert_eq!(engine.count("library_init"), 2);

    assert_eq!(first.with_channel(|c| c.id), 0);
    assert_eq!(second.with_channel(|c| c.id), 1);

    drop(first);
    assert_eq!(engine.count("library_cleanup"), 1);
    assert_eq!(second.state(), ChannelState::Ready);
    drop(second);
    assert_eq!(engine.count("library_cleanup"), 2);
    assert_eq!(engine.live_resources(), 0);
}
