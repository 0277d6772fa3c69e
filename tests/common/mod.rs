//! Test doubles: a local heap profile endpoint and a fake converter/uploader.
#![allow(dead_code)]

use std::{
    fs, io, net,
    path::{Path, PathBuf},
    sync::{atomic::{AtomicUsize, Ordering}, Arc, Mutex},
    thread,
    time::{Duration, Instant},
};
use axum::{http::StatusCode, routing::get, Router};
use heap_bridge::config::{Config, Label};
use heap_bridge::runner::{ProcessOutput, ProcessRunner};

pub const HEAP_PROFILE: &str = "heap profile: total 128 objects";
pub const PPROF_BYTES: &[u8] = &[0x1f, 0x8b, 0x08, 0x00, 0x01, 0x02, 0x03];
pub const RECEIPT: &str = "level=info msg=\"successfully uploaded profile\"";

/// A heap profile endpoint on 127.0.0.1, answering every request with the same status and body.
pub struct ProfileSource {
    pub url: String,
    requests: Arc<AtomicUsize>,
}

impl ProfileSource {
    pub fn start(status: StatusCode, body: &'static str) -> Self {
        let listener = net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let url = format!("http://{}/debug/pprof/heap", listener.local_addr().unwrap());
        let requests = Arc::new(AtomicUsize::new(0));

        let counter = requests.clone();
        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            runtime.block_on(async move {
                let app = Router::new().route("/debug/pprof/heap", get(move || {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        (status, body)
                    }
                }));
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                axum::serve(listener, app).await.unwrap();
            });
        });

        ProfileSource { url, requests }
    }
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// The content of the input file (the last argument) at the time of the invocation.
    pub input: Vec<u8>,
    pub started: Instant,
}

/// Stands in for pprof and profilecli.
pub struct FakeRunner {
    pub converter_output: ProcessOutput,
    pub uploader_output: ProcessOutput,
    pub delay: Duration,
    /// Replaces `delay` for the very first invocation only.
    pub first_delay: Option<Duration>,
    invocations: Mutex<Vec<Invocation>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl FakeRunner {
    pub fn succeeding() -> Self {
        FakeRunner {
            converter_output: ProcessOutput { code: Some(0), stdout: PPROF_BYTES.to_vec(), stderr: Vec::new() },
            uploader_output: ProcessOutput { code: Some(0), stdout: format!("{}\n", RECEIPT).into_bytes(), stderr: Vec::new() },
            delay: Duration::ZERO,
            first_delay: None,
            invocations: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }
    pub fn failing_conversion() -> Self {
        FakeRunner {
            converter_output: ProcessOutput { code: Some(1), stdout: Vec::new(), stderr: b"fetching profile: unrecognized profile format".to_vec() },
            ..FakeRunner::succeeding()
        }
    }
    pub fn failing_upload() -> Self {
        FakeRunner {
            uploader_output: ProcessOutput { code: Some(1), stdout: Vec::new(), stderr: b"failed to upload: connection refused".to_vec() },
            ..FakeRunner::succeeding()
        }
    }
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
    pub fn with_first_delay(mut self, delay: Duration) -> Self {
        self.first_delay = Some(delay);
        self
    }
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }
    pub fn programs(&self) -> Vec<String> {
        self.invocations().into_iter().map(|i| i.program).collect()
    }
    /// The highest number of invocations that were running at the same time.
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

impl ProcessRunner for FakeRunner {
    fn run(&self, program: &str, args: &[String]) -> io::Result<ProcessOutput> {
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);

        let started = Instant::now();
        let input = args.last().map(|path| fs::read(path).unwrap_or_default()).unwrap_or_default();
        let delay = {
            let mut invocations = self.invocations.lock().unwrap();
            let delay = match self.first_delay {
                Some(first_delay) if invocations.is_empty() => first_delay,
                _ => self.delay,
            };
            invocations.push(Invocation { program: program.to_string(), args: args.to_vec(), input, started });
            delay
        };
        thread::sleep(delay);

        self.active.fetch_sub(1, Ordering::SeqCst);
        match program {
            "pprof" => Ok(self.converter_output.clone()),
            "profilecli" => Ok(self.uploader_output.clone()),
            other => Err(io::Error::new(io::ErrorKind::NotFound, format!("{} not found", other))),
        }
    }
}

pub fn test_config(profile_url: &str, temp_dir: &Path) -> Config {
    Config {
        profile_url: profile_url.to_string(),
        reference_binary: PathBuf::from("/build-output/heap_profile_server"),
        temp_dir: temp_dir.to_path_buf(),
        backend_url: String::from("http://pyroscope:4040"),
        interval: Duration::from_secs(30),
        listen_address: String::from("127.0.0.1:0"),
        labels: vec![Label { key: String::from("service_name"), value: String::from("cpp-heap") }],
        converter: String::from("pprof"),
        uploader: String::from("profilecli"),
        fetch_timeout: Some(Duration::from_secs(5)),
        accept_invalid_certs: false,
    }
}

pub fn files_in(directory: &Path) -> usize {
    fs::read_dir(directory).unwrap().count()
}
