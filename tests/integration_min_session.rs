// Drives the compiled binary through a PTY so the real crossterm input path
// and event loop are exercised.
//
// Requires a TTY; ignored by default.
// Run manually via: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn minimal_session_completes_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("flashdeck");
    let cmd = format!("{} --no-persist -t css", bin.display());

    let mut p = spawn(cmd)?;
    std::thread::sleep(Duration::from_millis(200));

    // start, answer one card, end the session, then quit from the review screen
    p.send("\r")?;
    std::thread::sleep(Duration::from_millis(100));
    p.send("y")?;
    std::thread::sleep(Duration::from_millis(100));
    p.send("\x1b")?;
    std::thread::sleep(Duration::from_millis(200));
    p.send("q")?;

    p.expect(Eof)?;
    Ok(())
}
