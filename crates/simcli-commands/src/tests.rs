//! Console sessions driven through the context manager.

use std::cell::RefCell;
use std::rc::Rc;

use simcli_core::{
    CliConfig, CommandRegistry, Context, ContextHandler, ContextManager, Dispatcher, MemorySink,
};

use super::*;

struct Console {
    storage: Rc<RefCell<MemoryStorage>>,
    dispatcher: Rc<Dispatcher>,
    top: Rc<Context>,
    cli: ContextManager,
    out: MemorySink,
}

impl Console {
    fn new() -> Self {
        Self::with_storage(MemoryStorage::new(), CliConfig::default())
    }

    fn with_storage(storage: MemoryStorage, config: CliConfig) -> Self {
        let storage = Rc::new(RefCell::new(storage));
        let mut reg = CommandRegistry::with_config(config.clone());
        register_builtins(&mut reg, Rc::clone(&storage) as SharedStorage).unwrap();
        let dispatcher = Rc::new(Dispatcher::new(Rc::new(reg)));
        let handle = Rc::clone(&dispatcher);
        let top = Rc::new(Context::new(
            "Main_context",
            move |data: &[u8], cli: &mut ContextManager| handle.handle(data, cli),
        ));
        let out = MemorySink::new();
        let cli = ContextManager::with_config(Rc::clone(&top), &config).with_sink(out.clone());
        Self {
            storage,
            dispatcher,
            top,
            cli,
            out,
        }
    }

    fn send(&mut self, data: &str) -> bool {
        self.cli.deliver(data.as_bytes()).unwrap()
    }

    fn at_top(&self) -> bool {
        Rc::ptr_eq(self.cli.active(), &self.top)
    }
}

#[test]
fn builtins_registered() {
    let storage: SharedStorage = Rc::new(RefCell::new(MemoryStorage::new()));
    let mut reg = CommandRegistry::new();
    register_builtins(&mut reg, storage).unwrap();
    assert_eq!(reg.len(), 2);
    assert_eq!(reg.find_by_id(SENDFILE_ID).map(|c| c.name()), Some("sendfile"));
    assert_eq!(reg.find_by_id(MOUNTSD_ID).map(|c| c.name()), Some("mountsd"));
}

#[test]
fn builtins_twice_rejected() {
    let storage: SharedStorage = Rc::new(RefCell::new(MemoryStorage::new()));
    let mut reg = CommandRegistry::new();
    register_builtins(&mut reg, Rc::clone(&storage)).unwrap();
    assert!(register_builtins(&mut reg, storage).is_err());
    assert_eq!(reg.len(), 2);
}

#[test]
fn sendfile_streams_body_then_returns_to_commands() {
    let mut c = Console::new();
    assert!(c.send("sendfile -n 10 -o -f feriX1.tct\r\n"));
    assert!(!c.at_top());
    assert_eq!(c.cli.active().name(), "sendfile");
    assert_eq!(c.storage.borrow().open_file(), Some("feriX1.tct"));

    assert!(!c.send("0123456789"));
    assert!(c.at_top());
    assert_eq!(c.storage.borrow().file("feriX1.tct"), Some(&b"0123456789"[..]));
    assert!(c.storage.borrow().open_file().is_none());
}

#[test]
fn sendfile_in_many_chunks() {
    let mut c = Console::new();
    assert!(c.send("sendfile -n 100"));
    for i in 0..9 {
        assert!(c.send("0123456789"), "chunk {i} should continue");
    }
    assert!(!c.send("0123456789"));
    assert!(c.at_top());
    assert_eq!(c.storage.borrow().file("Default").map(<[u8]>::len), Some(100));
}

#[test]
fn sendfile_caps_final_chunk_at_declared_size() {
    let mut c = Console::new();
    assert!(c.send("sendfile -n 4 -f x"));
    assert!(!c.send("abcdefgh\r\n"));
    assert_eq!(c.storage.borrow().file("x"), Some(&b"abcd"[..]));
}

#[test]
fn stream_chunks_lose_only_the_c_string_tail() {
    let mut c = Console::new();
    assert!(c.send("sendfile -n 6 -f x"));
    assert!(c.send("abc\r\n\0"));
    assert!(!c.send("def"));
    assert_eq!(c.storage.borrow().file("x"), Some(&b"abcdef"[..]));
}

#[test]
fn newlines_in_the_body_are_stored_verbatim() {
    let mut c = Console::new();
    assert!(c.send("sendfile -n 4 -f x\n"));
    assert!(c.send("a\n"));
    assert!(!c.send("b\n"));
    assert!(c.at_top());
    assert_eq!(c.storage.borrow().file("x"), Some(&b"a\nb\n"[..]));
}

#[test]
fn commands_are_not_parsed_during_a_transfer() {
    let mut c = Console::new();
    assert!(c.send("sendfile -n 8 -f x"));
    assert!(!c.send("mountsd\n"));
    assert!(c.out.is_empty());
    assert!(!c.storage.borrow().is_mounted());
    assert_eq!(c.storage.borrow().file("x"), Some(&b"mountsd\n"[..]));
}

#[test]
fn mountsd_reports_success() {
    let mut c = Console::new();
    assert!(c.send("mountsd"));
    assert_eq!(c.out.take(), "Mount success\n");
    assert!(c.storage.borrow().is_mounted());
}

#[test]
fn mountsd_reports_failure() {
    let mut c = Console::with_storage(MemoryStorage::without_card(), CliConfig::default());
    assert!(!c.send("mountsd\r\n"));
    assert_eq!(c.out.take(), "Mount failed\n");
}

#[test]
fn mountsd_rejects_arguments() {
    let mut c = Console::new();
    assert!(!c.send("mountsd -f x"));
    assert_eq!(c.out.take(), "Command doesn't have arguments\n");
    assert!(!c.storage.borrow().is_mounted());
}

#[test]
fn misspelled_command_runs_nothing() {
    let mut c = Console::new();
    assert!(!c.send("mount_sd"));
    assert!(c.out.is_empty());
    assert!(!c.storage.borrow().is_mounted());
}

#[test]
fn sendfile_argument_diagnostics() {
    let cases = [
        ("sendfile -f -n 100", "Missing argument value\n"),
        ("sendfile -n abc", "Bad argument value\n"),
        ("sendfile -n", "Bad argument value\n"),
        ("sendfile -n -5", "Bad argument value\n"),
        ("sendfile -z", "Unknown argument\n"),
        ("sendfile -f a+b", "Restricted character in filename\n"),
    ];
    for (line, msg) in cases {
        let mut c = Console::new();
        assert!(!c.send(line), "{line} should fail");
        assert_eq!(c.out.take(), msg, "output for {line}");
        assert!(c.at_top(), "{line} must not acquire");
        assert!(c.storage.borrow().open_file().is_none());
    }
}

#[test]
fn long_file_name_truncated() {
    let mut c = Console::new();
    let long = "a".repeat(40);
    assert!(c.send(&format!("sendfile -n 1 -f {long}")));
    assert_eq!(c.storage.borrow().open_file().map(str::len), Some(31));
}

#[test]
fn existing_file_needs_overwrite_flag() {
    let mut c = Console::new();
    assert!(c.send("sendfile -n 1 -f log"));
    assert!(!c.send("a"));

    assert!(!c.send("sendfile -n 1 -f log"));
    assert_eq!(c.out.take(), "Cannot open file\n");
    assert!(c.at_top());

    assert!(c.send("sendfile -n 1 -o -f log"));
    assert!(!c.send("b"));
    assert_eq!(c.storage.borrow().file("log"), Some(&b"b"[..]));
}

#[test]
fn sendfile_fails_cleanly_when_stack_is_full() {
    let config = CliConfig {
        context_stack_size: 1,
        ..CliConfig::default()
    };
    let mut c = Console::with_storage(MemoryStorage::new(), config);
    let other = Rc::new(Context::new("other", |_: &[u8], _: &mut ContextManager| true));
    c.cli.acquire(Rc::clone(&other)).unwrap();

    assert_eq!(c.dispatcher.process("sendfile -n 3 -f x", &mut c.cli), 0);
    assert_eq!(c.out.take(), "Context not acquired\n");
    assert!(Rc::ptr_eq(c.cli.active(), &other));
    assert!(c.storage.borrow().open_file().is_none());
}
