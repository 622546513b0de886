use std::env;
use std::fs;
use std::net::UdpSocket;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::thread;

const BIN: &str = env!("CARGO_BIN_EXE_sntpoll");

/// Writes a config file unique to this test and returns its path.
fn config(name: &str, text: &str) -> PathBuf {
  let path = env::temp_dir().join(format!("sntpoll-{}-{}.toml", name, std::process::id()));
  fs::write(&path, text).unwrap();
  path
}

fn run(config: &PathBuf, args: &[&str]) -> Output {
  Command::new(BIN)
    .args(args)
    .env("SNTPOLL_CONFIG", config)
    .output()
    .unwrap()
}

fn quiet(name: &str) -> PathBuf {
  config(name, "[log]\nlevel = \"off\"\n")
}

/// Answers `count` requests with a reply whose T2 and T3 are Unix 1000.0
/// and 1000.5 and whose root dispersion is 0.5s, padded or cut to `len`.
fn fake_server(count: usize, len: usize) -> (u16, thread::JoinHandle<()>) {
  let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
  let port = socket.local_addr().unwrap().port();
  let handle = thread::spawn(move || {
    let mut reply = vec![0u8; 48];
    reply[0] = 0x24;
    reply[1] = 1;
    reply[8..12].copy_from_slice(&[0x00, 0x00, 0x80, 0x00]);
    reply[32..40].copy_from_slice(&[0x83, 0xaa, 0x82, 0x68, 0, 0, 0, 0]);
    reply[40..48].copy_from_slice(&[0x83, 0xaa, 0x82, 0x68, 0x80, 0, 0, 0]);
    reply.resize(len, 0);

    let mut buf = [0u8; 128];
    for _ in 0..count {
      let (n, from) = socket.recv_from(&mut buf).unwrap();
      assert_eq!(n, 48);
      assert_eq!(buf[0], 0x23);
      assert!(buf[1..48].iter().all(|&b| b == 0));
      socket.send_to(&reply, from).unwrap();
    }
  });
  (port, handle)
}

#[test]
fn missing_operands() {
  let cfg = quiet("missing");
  for args in &[&[][..], &["3"][..]] {
    let out = run(&cfg, args);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("usage"));
    assert!(out.stdout.is_empty());
  }
}

#[test]
fn non_numeric_count() {
  let out = run(&quiet("nonnumeric"), &["-1", "127.0.0.1"]);
  assert_eq!(out.status.code(), Some(2));
}

#[test]
fn zero_count() {
  let out = run(&quiet("zero"), &["0", "127.0.0.1"]);
  assert_eq!(out.status.code(), Some(3));
}

#[test]
fn unresolvable_server_aborts() {
  let out = run(&quiet("resolve"), &["1", "no-such-host.invalid", "127.0.0.1"]);
  assert_eq!(out.status.code(), Some(4));
  assert!(out.stdout.is_empty());
}

#[test]
fn broken_config() {
  let cfg = config("broken", "[poll\ninterval = 1\n");
  let out = run(&cfg, &["1", "127.0.0.1"]);
  assert_eq!(out.status.code(), Some(10));
}

#[test]
fn polls_fake_server() {
  let (port, server) = fake_server(3, 48);
  let cfg = config("poll",
                   &format!("[log]\nlevel = \"off\"\n[network]\nport = {}\n[poll]\ninterval = 0\ntimeout = 5\n",
                            port));
  let out = run(&cfg, &["3", "127.0.0.1"]);
  server.join().unwrap();

  assert_eq!(out.status.code(), Some(0));
  let stdout = String::from_utf8(out.stdout).unwrap();
  let lines: Vec<&str> = stdout.lines().collect();
  assert_eq!(lines.len(), 3);
  for (i, line) in lines.iter().enumerate() {
    let fields: Vec<&str> = line.split(';').collect();
    assert_eq!(fields.len(), 6);
    assert_eq!(fields[0], "127.0.0.1");
    assert_eq!(fields[1], i.to_string());
    assert_eq!(fields[2], "0.500000000");
    for field in &fields[3..] {
      let (_, frac) = field.split_at(field.find('.').unwrap());
      assert_eq!(frac.len(), 7, "six fractional digits in {}", field);
      field.parse::<f64>().unwrap();
    }
  }
  assert!(lines[0].starts_with("127.0.0.1;0;0.500000000;0.000000;"));
}

#[test]
fn short_reply_is_fatal() {
  let (port, server) = fake_server(1, 40);
  let cfg = config("short",
                   &format!("[log]\nlevel = \"off\"\n[network]\nport = {}\n[poll]\ntimeout = 5\n", port));
  let out = run(&cfg, &["1", "127.0.0.1"]);
  server.join().unwrap();

  assert_eq!(out.status.code(), Some(9));
  assert!(out.stdout.is_empty());
}

#[test]
fn silent_server_times_out() {
  let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
  let port = socket.local_addr().unwrap().port();
  let cfg = config("timeout",
                   &format!("[log]\nlevel = \"off\"\n[network]\nport = {}\n[poll]\ntimeout = 1\n", port));
  let out = run(&cfg, &["1", "127.0.0.1"]);
  drop(socket);

  assert_eq!(out.status.code(), Some(7));
}
