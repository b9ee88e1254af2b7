#![cfg(target_os = "linux")]

use std::ffi::OsStr;
use std::fs::{self, File};

use anyhow::Result;
use inwatch_channel::{
    Channel, DEFAULT_READ_BUFFER, ErrorKind, Event, EventMask, InitFlags, WatchMask, decode,
};

fn nonblocking() -> Result<Channel> {
    Ok(Channel::open(InitFlags::NONBLOCKING | InitFlags::CLOSE_ON_EXEC)?)
}

/// Reads until the queue is empty. Filesystem events are queued before the
/// triggering syscall returns, so nothing is lost by not waiting.
fn drain(channel: &mut Channel) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    loop {
        match channel.read_events(DEFAULT_READ_BUFFER) {
            Ok(buffer) => events.extend(decode(&buffer)?),
            Err(err) if err.kind() == ErrorKind::WouldBlock => return Ok(events),
            Err(err) => return Err(err.into()),
        }
    }
}

#[test]
fn test_nonblocking_read_with_nothing_queued_would_block() -> Result<()> {
    let mut channel = nonblocking()?;

    let err = channel.read_events(DEFAULT_READ_BUFFER).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::WouldBlock);
    assert_eq!(err.code(), Some(libc::EAGAIN));
    Ok(())
}

#[test]
fn test_create_in_watched_directory() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut channel = nonblocking()?;
    let watch = channel.add_watch(dir.path(), WatchMask::CREATE | WatchMask::DELETE)?;

    File::create(dir.path().join("created.txt"))?;

    let events = drain(&mut channel)?;
    assert_eq!(events.len(), 1);

    let event = &events[0];
    assert!(event.masks(EventMask::CREATE));
    assert!(!event.masks(EventMask::ISDIR));
    assert_eq!(event.name(), Some(OsStr::new("created.txt")));
    assert_eq!(event.watch_ref(), watch.descriptor_id());
    assert!(watch.matches(event));
    Ok(())
}

#[test]
fn test_watching_missing_path_is_not_found() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut channel = nonblocking()?;

    let err = channel
        .add_watch(dir.path().join("missing"), WatchMask::ALL_EVENTS)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.code(), Some(libc::ENOENT));
    assert_eq!(channel.watch_count(), 0);
    Ok(())
}

#[test]
fn test_only_dir_on_a_file_is_not_a_directory() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let file = dir.path().join("plain");
    File::create(&file)?;

    let mut channel = nonblocking()?;
    let err = channel
        .add_watch(&file, WatchMask::MODIFY | WatchMask::ONLYDIR)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotADirectory);
    Ok(())
}

#[test]
fn test_empty_mask_is_invalid_argument() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut channel = nonblocking()?;

    let err = channel.add_watch(dir.path(), WatchMask::empty()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(err.code(), Some(libc::EINVAL));
    Ok(())
}

#[test]
fn test_rename_pairs_share_a_cookie() -> Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("before"), b"x")?;

    let mut channel = nonblocking()?;
    channel.add_watch(dir.path(), WatchMask::MOVE)?;

    fs::rename(dir.path().join("before"), dir.path().join("after"))?;

    let events = drain(&mut channel)?;
    assert_eq!(events.len(), 2);

    let (from, to) = (&events[0], &events[1]);
    assert!(from.masks(EventMask::MOVED_FROM));
    assert!(to.masks(EventMask::MOVED_TO));
    assert_eq!(from.name(), Some(OsStr::new("before")));
    assert_eq!(to.name(), Some(OsStr::new("after")));
    assert_ne!(from.cookie(), 0);
    assert_eq!(from.cookie(), to.cookie());
    Ok(())
}

#[test]
fn test_add_then_remove_then_remove_again() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut channel = nonblocking()?;

    let watch = channel.add_watch(dir.path(), WatchMask::ALL_EVENTS)?;
    assert_eq!(channel.watch_count(), 1);

    channel.remove_watch(watch.clone())?;
    assert_eq!(channel.watch_count(), 0);

    let err = channel.remove_watch(watch).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    // The kernel acknowledges the removal with an IGNORED record.
    let events = drain(&mut channel)?;
    assert!(events.iter().any(|event| event.masks(EventMask::IGNORED)));
    Ok(())
}

#[test]
fn test_watch_from_another_channel_is_rejected() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut first = nonblocking()?;
    let mut second = nonblocking()?;

    let watch = first.add_watch(dir.path(), WatchMask::CREATE)?;
    second.add_watch(dir.path(), WatchMask::CREATE)?;

    let err = second.remove_watch(watch.clone()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(second.watch_count(), 1);

    first.remove_watch(watch)?;
    Ok(())
}

#[test]
fn test_rewatching_same_path_reuses_descriptor() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut channel = nonblocking()?;

    let first = channel.add_watch(dir.path(), WatchMask::CREATE)?;
    let second = channel.add_watch(dir.path(), WatchMask::DELETE | WatchMask::MASK_ADD)?;
    assert_eq!(first, second);
    assert_eq!(channel.watch_count(), 1);
    Ok(())
}

#[test]
fn test_stale_watch_after_close() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut channel = nonblocking()?;
    let watch = channel.add_watch(dir.path(), WatchMask::CREATE)?;

    channel.close();

    let err = channel.remove_watch(watch).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadDescriptor);
    assert_eq!(channel.watch_count(), 0);
    Ok(())
}

#[test]
fn test_oneshot_watch_is_dropped_from_bookkeeping() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut channel = nonblocking()?;
    let watch = channel.add_watch(dir.path(), WatchMask::CREATE | WatchMask::ONESHOT)?;

    File::create(dir.path().join("once"))?;

    let events = channel.read_decoded(DEFAULT_READ_BUFFER)?;
    assert!(events.iter().any(|event| event.masks(EventMask::CREATE)));
    assert!(events.iter().any(|event| event.masks(EventMask::IGNORED)));
    assert_eq!(channel.watch_count(), 0);

    let err = channel.remove_watch(watch).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    Ok(())
}

#[test]
fn test_tiny_capacity_is_raised_to_one_record() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut channel = nonblocking()?;
    channel.add_watch(dir.path(), WatchMask::CREATE)?;

    let long_name = "n".repeat(200);
    File::create(dir.path().join(&long_name))?;

    let buffer = channel.read_events(1)?;
    let events = decode(&buffer)?;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name(), Some(OsStr::new(long_name.as_str())));
    Ok(())
}

#[test]
fn test_file_watch_events_carry_no_name() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let file = dir.path().join("watched");
    File::create(&file)?;

    let mut channel = nonblocking()?;
    channel.add_watch(&file, WatchMask::MODIFY)?;
    fs::write(&file, b"changed")?;

    let events = drain(&mut channel)?;
    assert!(!events.is_empty());
    assert!(events.iter().all(|event| event.masks(EventMask::MODIFY)));
    assert!(events.iter().all(|event| event.name().is_none() && event.len() == 0));
    Ok(())
}
