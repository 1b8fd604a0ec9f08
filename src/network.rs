use defmt::{info, warn};
use embassy_net::Stack;
use embassy_net::tcp::TcpSocket;
use embassy_time::Duration;
use embedded_io_async::Write;
use heapless::Vec;

use rp_rtc_alarm::command;
use rp_rtc_alarm::{Clock, Error, SharedRtc};

const SERVER_PORT: u16 = 23456;
const IDLE_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_LINE: usize = 256;

/// Serves one client at a time, one JSON request per line.
pub async fn run_command_server<C: Clock>(stack: Stack<'_>, rtc: &SharedRtc<C>) -> ! {
    let mut rx_buf = [0u8; 1024];
    let mut tx_buf = [0u8; 1024];

    loop {
        let mut socket = TcpSocket::new(stack, &mut rx_buf, &mut tx_buf);
        socket.set_timeout(Some(IDLE_TIMEOUT));

        info!("listening on port {}", SERVER_PORT);
        if let Err(e) = socket.accept(SERVER_PORT).await {
            warn!("accept failed: {}", e);
            continue;
        }
        info!("client connected");

        serve_client(&mut socket, rtc).await;

        socket.close();
        let _ = socket.flush().await;
        info!("client disconnected");
    }
}

async fn serve_client<C: Clock>(socket: &mut TcpSocket<'_>, rtc: &SharedRtc<C>) {
    let mut line: Vec<u8, MAX_LINE> = Vec::new();
    let mut overflow = false;
    let mut buf = [0u8; 64];

    loop {
        let n = match socket.read(&mut buf).await {
            Ok(0) => return, // Verbindung geschlossen
            Ok(n) => n,
            Err(e) => {
                warn!("read failed: {}", e);
                return;
            }
        };

        for &byte in &buf[..n] {
            match byte {
                b'\r' => {}
                b'\n' => {
                    let reply = if overflow {
                        command::error_line(Error::InvalidArgument)
                    } else {
                        rtc.lock(|rtc| command::handle_line(rtc, &line))
                    };
                    line.clear();
                    overflow = false;

                    if send_line(socket, &reply).await.is_err() {
                        return;
                    }
                }
                _ => {
                    if line.push(byte).is_err() {
                        overflow = true;
                    }
                }
            }
        }
    }
}

async fn send_line(socket: &mut TcpSocket<'_>, reply: &str) -> Result<(), embassy_net::tcp::Error> {
    socket.write_all(reply.as_bytes()).await?;
    socket.write_all(b"\n").await
}
