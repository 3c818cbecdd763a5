use std::error::Error;
use std::path::PathBuf;

use prost::Message;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet,
    MethodDescriptorProto, ServiceDescriptorProto,
};

fn field(name: &str, number: i32, ty: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_owned()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(ty as i32),
        ..Default::default()
    }
}

fn repeated(name: &str, number: i32, ty: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        label: Some(Label::Repeated as i32),
        ..field(name, number, ty)
    }
}

fn message_field(name: &str, number: i32, type_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_owned()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(Type::Message as i32),
        type_name: Some(type_name.to_owned()),
        ..Default::default()
    }
}

fn message(name: &str, fields: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_owned()),
        field: fields,
        ..Default::default()
    }
}

fn method(
    name: &str,
    input: &str,
    output: &str,
    client_streaming: bool,
    server_streaming: bool,
) -> MethodDescriptorProto {
    MethodDescriptorProto {
        name: Some(name.to_owned()),
        input_type: Some(input.to_owned()),
        output_type: Some(output.to_owned()),
        client_streaming: Some(client_streaming),
        server_streaming: Some(server_streaming),
        ..Default::default()
    }
}

/// Builds the `FileDescriptorSet` for `proto/auth.proto` directly, so the
/// crate can be generated without a `protoc` binary on the build host.
fn auth_file_descriptor_set() -> FileDescriptorSet {
    use Type::{Int64, String as Str, Uint32};

    let messages = vec![
        message(
            "LoginRequest",
            vec![field("username", 1, Str), field("password", 2, Str)],
        ),
        message("LoginResponse", vec![field("access_token", 1, Str)]),
        message("GetProfileRequest", vec![]),
        message(
            "User",
            vec![
                field("id", 1, Int64),
                field("username", 2, Str),
                field("email", 3, Str),
                field("created_at", 4, Str),
            ],
        ),
        message(
            "GetProfileResponse",
            vec![message_field("user", 1, ".auth.User")],
        ),
        message(
            "StreamNotificationsRequest",
            vec![
                field("access_token", 1, Str),
                field("duration_seconds", 2, Uint32),
            ],
        ),
        message(
            "Notification",
            vec![
                field("id", 1, Str),
                field("title", 2, Str),
                field("message", 3, Str),
                field("timestamp", 4, Str),
                field("type", 5, Str),
            ],
        ),
        message("ClientMessage", vec![field("message", 1, Str)]),
        message(
            "SendMessagesResponse",
            vec![
                field("total_messages", 1, Uint32),
                field("status", 2, Str),
                repeated("processed_messages", 3, Str),
            ],
        ),
        message(
            "ChatMessage",
            vec![
                field("access_token", 1, Str),
                field("username", 2, Str),
                field("message", 3, Str),
                field("timestamp", 4, Str),
                field("room", 5, Str),
            ],
        ),
    ];

    let service = ServiceDescriptorProto {
        name: Some("AuthService".to_owned()),
        method: vec![
            method(
                "Login",
                ".auth.LoginRequest",
                ".auth.LoginResponse",
                false,
                false,
            ),
            method(
                "GetProfile",
                ".auth.GetProfileRequest",
                ".auth.GetProfileResponse",
                false,
                false,
            ),
            method(
                "StreamNotifications",
                ".auth.StreamNotificationsRequest",
                ".auth.Notification",
                false,
                true,
            ),
            method(
                "SendMessages",
                ".auth.ClientMessage",
                ".auth.SendMessagesResponse",
                true,
                false,
            ),
            method(
                "ChatStream",
                ".auth.ChatMessage",
                ".auth.ChatMessage",
                true,
                true,
            ),
        ],
        ..Default::default()
    };

    let file = FileDescriptorProto {
        name: Some("auth.proto".to_owned()),
        package: Some("auth".to_owned()),
        message_type: messages,
        service: vec![service],
        syntax: Some("proto3".to_owned()),
        ..Default::default()
    };

    FileDescriptorSet { file: vec![file] }
}

fn main() -> Result<(), Box<dyn Error>> {
    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);
    let fds_path = out_dir.join("auth.fds");

    let fds = auth_file_descriptor_set();
    std::fs::write(&fds_path, fds.encode_to_vec())?;

    tonic_build::configure()
        .file_descriptor_set_path(&fds_path)
        .skip_protoc_run()
        .compile(&["proto/auth.proto"], &["proto"])?;

    println!("cargo:rerun-if-changed=proto/auth.proto");
    Ok(())
}
