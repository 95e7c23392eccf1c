use std::path::Path;

use anyhow::Context;
use pgstore_notp::{Packet, PacketReader, PacketWriter, ProtocolPacket};
use pgstore_objects::{MultiSectionsObject, ObjectInfo, ObjectManager, ObjectType, SectionError};
use tracing::{debug, warn};

use crate::config::CliConfig;

/// Encode each file as a blob section of one bundle.
///
/// A file that cannot be read or encoded becomes a failed section; it does
/// not stop the rest of the bundle.
pub fn build_bundle(
    manager: &ObjectManager,
    bundle_path: &str,
    files: &[impl AsRef<Path>],
) -> anyhow::Result<MultiSectionsObject> {
    let mut bundle = MultiSectionsObject::new(bundle_path, files.len());
    for (index, file) in files.iter().enumerate() {
        let file = file.as_ref();
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string());
        let produced = std::fs::read(file)
            .map_err(anyhow::Error::from)
            .and_then(|data| Ok(manager.create_blob_object(&data)?));
        let (object, code_id, error) = match produced {
            Ok(object) => {
                let code_id = object.id().to_hex();
                (Some(object), code_id, None)
            }
            Err(e) => {
                warn!(file = %file.display(), error = %e, "section failed");
                let boxed: Box<dyn std::error::Error + Send + Sync> = e.into();
                (None, String::new(), Some(SectionError::from(boxed)))
            }
        };
        bundle.add_section_object_with_params(
            object,
            ObjectType::Blob.as_str(),
            name,
            code_id,
            ObjectType::Blob.as_str(),
            index,
            error,
        )?;
    }
    Ok(bundle)
}

/// Write the bundle's objects as the data packet stream of a NOTP packet.
///
/// Only the produced objects go on the wire, one data packet each. Section
/// metadata (name, code id, index) and failed sections stay behind, so the
/// receiving side gets the objects back but cannot rebuild the bundle.
pub fn pack_bundle(bundle: &MultiSectionsObject, config: &CliConfig) -> anyhow::Result<Packet> {
    let records: Vec<&[u8]> = bundle.objects().map(|o| o.content()).collect();
    if records.is_empty() {
        anyhow::bail!("bundle {} produced no objects", bundle.path());
    }
    let mut writer = PacketWriter::new();
    writer.write_protocol(&ProtocolPacket::new(config.protocol_version))?;
    writer.write_data_stream(config.packet_type, &records)?;
    debug!(path = bundle.path(), objects = records.len(), "bundle packed");
    Ok(writer.into_packet())
}

/// Decode every object record carried by a NOTP packet.
pub fn unpack_packet(manager: &ObjectManager, packet: Packet) -> anyhow::Result<Vec<ObjectInfo>> {
    let reader = PacketReader::new(packet);
    let protocol = reader.read_protocol().context("reading control packet")?;
    if !protocol.is_supported() {
        warn!(version = protocol.version, "unsupported protocol version; decoding anyway");
    }
    let mut infos = Vec::new();
    for (i, payload) in reader.data_packets().enumerate() {
        let payload = payload.with_context(|| format!("reading data packet {}", i + 1))?;
        for object in manager.read_records(payload)? {
            infos.push(manager.decode(&object)?);
        }
    }
    Ok(infos)
}
