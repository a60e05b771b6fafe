use super::*;

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["helm"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).expect("valid arguments")
}

#[test]
fn maps_subcommands_to_wire_commands() {
    assert_eq!(
        parse(&["power", "on"]).command.to_client_command(),
        Some(ClientCommand::PowerToggle(true))
    );
    assert_eq!(
        parse(&["power", "off"]).command.to_client_command(),
        Some(ClientCommand::PowerToggle(false))
    );
    assert_eq!(
        parse(&["backward"]).command.to_client_command(),
        Some(ClientCommand::Backward)
    );
    assert_eq!(
        parse(&["speed", "45.5"]).command.to_client_command(),
        Some(ClientCommand::ChangeSpeed(45.5))
    );
    assert_eq!(
        parse(&["watch-video", "--frames", "3"])
            .command
            .to_client_command(),
        None
    );
}

#[test]
fn accepts_negative_coordinates() {
    let cli = parse(&["save-location", "-33.86", "151.2"]);
    assert_eq!(
        cli.command.to_client_command(),
        Some(ClientCommand::SaveLocation(Location {
            latitude: -33.86,
            longitude: 151.2
        }))
    );
}

#[test]
fn rejects_unknown_power_state() {
    assert!(Cli::try_parse_from(["helm", "power", "maybe"]).is_err());
}

#[test]
fn defaults_to_local_relay() {
    let cli = parse(&["stop"]);
    assert_eq!(cli.server_url, "http://localhost:5000");
    assert_eq!(cli.timeout_secs, 5);
}

#[test]
fn builds_websocket_url_from_http_base() {
    assert_eq!(
        ws_url("http://localhost:5000").expect("url"),
        "ws://localhost:5000/ws"
    );
    assert_eq!(
        ws_url("https://boat.example.com/some/path?x=1").expect("url"),
        "wss://boat.example.com/ws"
    );
    assert!(ws_url("ftp://boat.example.com").is_err());
    assert!(ws_url("not a url").is_err());
}
