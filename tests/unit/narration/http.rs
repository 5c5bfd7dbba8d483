use std::io::{BufRead as _, BufReader, Read as _, Write as _};
use std::net::TcpListener;

use super::*;

/// Answer one POST on a loopback port with `body` as JSON and return the URL.
fn serve_once(body: &'static str) -> (String, std::thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/speech", listener.local_addr().unwrap());
    let handle = std::thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream);
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':')
                && name.eq_ignore_ascii_case("content-length")
            {
                content_length = value.trim().parse().unwrap();
            }
        }
        let mut request_body = vec![0u8; content_length];
        reader.read_exact(&mut request_body).unwrap();
        let mut stream = reader.into_inner();
        write!(
            stream,
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
        .unwrap();
    });
    (url, handle)
}

fn endpoint(url: &str) -> ServiceEndpoint {
    ServiceEndpoint {
        url: url.to_string(),
        api_key_env: "SLIDECAST_UNIT_TEST_KEY_NEVER_SET".to_string(),
        timeout_secs: 1,
    }
}

#[test]
fn speech_request_has_expected_wire_shape() {
    let req = SpeechRequest {
        speaker: "meera",
        target_language_code: "hi-IN",
        inputs: ["Photosynthesis converts light into energy"],
        pitch: 1.0,
        pace: 1.0,
        loudness: 1.0,
        speech_sample_rate: 22_050,
        enable_preprocessing: true,
        model: "bulbul:v1",
    };
    let v = serde_json::to_value(&req).unwrap();
    assert_eq!(v["speaker"], "meera");
    assert_eq!(v["inputs"][0], "Photosynthesis converts light into energy");
    assert_eq!(v["speech_sample_rate"], 22_050);
}

#[test]
fn image_request_uses_camel_case_parameters() {
    let req = ImageRequest {
        instances: [ImagePrompt {
            prompt: "a green leaf diagram",
        }],
        parameters: ImageParameters {
            sample_count: 1,
            aspect_ratio: "1:1",
        },
    };
    let v = serde_json::to_value(&req).unwrap();
    assert_eq!(v["instances"][0]["prompt"], "a green leaf diagram");
    assert_eq!(v["parameters"]["sampleCount"], 1);
    assert_eq!(v["parameters"]["aspectRatio"], "1:1");
}

#[test]
fn image_response_parses_prediction() {
    let r: ImageResponse = serde_json::from_str(
        r#"{ "predictions": [ { "bytesBase64Encoded": "aGk=", "mimeType": "image/png" } ] }"#,
    )
    .unwrap();
    assert_eq!(r.predictions[0].bytes_base64_encoded, "aGk=");
}

#[test]
fn unconfigured_endpoint_is_a_service_error() {
    let images = HttpImageGenerator::new(&endpoint("")).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let err = images.generate("a leaf", dir.path()).unwrap_err();
    assert!(matches!(
        err,
        SlidecastError::Service {
            service: ServiceKind::ImageGeneration,
            ..
        }
    ));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn missing_api_key_is_a_service_error() {
    let tr = HttpTranslator::new(&endpoint("http://127.0.0.1:9/translate"), "en-IN").unwrap();
    let err = tr.translate("hello", "hi-IN").unwrap_err();
    assert!(err.is_service());
    assert!(err.to_string().contains("SLIDECAST_UNIT_TEST_KEY_NEVER_SET"));
}

#[test]
fn new_files_are_complete_and_uniquely_named() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_new_file(dir.path(), "wav", b"RIFF").unwrap();
    let b = write_new_file(dir.path(), "wav", b"RIFF").unwrap();
    assert_ne!(a, b);
    assert_eq!(a.extension().unwrap(), "wav");
    assert_eq!(std::fs::read(&a).unwrap(), b"RIFF");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[test]
fn bad_base64_is_a_service_error() {
    let err = decode_base64(ServiceKind::Speech, "not base64 !!").unwrap_err();
    assert!(err.is_service());
    assert_eq!(decode_base64(ServiceKind::Speech, "aGk=").unwrap(), b"hi");
}

#[test]
fn undecodable_speech_payload_leaves_no_file_behind() {
    let (url, server) = serve_once(r#"{"audios":["bm90IGEgd2F2IGZpbGU="]}"#);
    let speech = HttpSpeechClient::new(&ServiceEndpoint {
        url,
        // Always present while cargo runs tests.
        api_key_env: "CARGO_PKG_NAME".to_string(),
        timeout_secs: 5,
    })
    .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let voice = Voice {
        speaker: "meera".to_string(),
        locale: "hi-IN".to_string(),
    };

    let err = speech
        .synthesize("Photosynthesis converts light into energy", &voice, dir.path())
        .unwrap_err();
    server.join().unwrap();

    assert!(err.is_service(), "{err}");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
