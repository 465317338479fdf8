// src/engine/descriptor.rs

//! Pipeline descriptor families.
//!
//! Descriptors are opaque to the supervisor; these builders only guarantee
//! that every family names the same two observation points: a
//! [`PROBE_ELEMENT`] whose buffer flow feeds the watchdog, and a
//! [`SINK_ELEMENT`] that exposes the bindable visual.

/// Element observed for buffer arrivals.
pub const PROBE_ELEMENT: &str = "videoconvert";

/// Sink element that exposes the video visual.
pub const SINK_ELEMENT: &str = "videosink";

/// SRT source addressed by stream id.
pub fn srt(endpoint: &str, stream_id: &str) -> String {
    format!(
        "srtclientsrc uri={endpoint}?streamid={stream_id} ! decodebin ! \
         videoconvert name={PROBE_ELEMENT} ! gtksink name={SINK_ELEMENT}"
    )
}

/// UDP/RTP H.264 chain with default latency behaviour.
pub fn udp_safe(port: u16) -> String {
    format!(
        "udpsrc port={port} ! \
         application/x-rtp,media=video,encoding-name=H264,payload=96 ! \
         rtph264depay ! h264parse ! avdec_h264 ! \
         videoconvert name={PROBE_ELEMENT} ! gtksink name={SINK_ELEMENT}"
    )
}

/// UDP/RTP H.264 chain tuned for minimal latency: enlarged source buffer,
/// shallow jitter buffer, and a sink that never waits on the clock.
pub fn udp_fast(port: u16) -> String {
    format!(
        "udpsrc port={port} buffer-size=200000 ! \
         application/x-rtp,media=video,encoding-name=H264,payload=96 ! \
         rtpjitterbuffer latency=20 drop-on-latency=false ! \
         rtph264depay ! h264parse ! avdec_h264 ! \
         videoconvert name={PROBE_ELEMENT} ! \
         gtksink sync=false max-lateness=0 qos=false name={SINK_ELEMENT}"
    )
}
