//! RDF vocabulary used when reading and writing task and file metadata.

/// `adms:status`, the predicate carrying a task's lifecycle status.
pub const ADMS_STATUS: &str = "http://www.w3.org/ns/adms#status";
/// `prov:used`, linking a task to the logical files it consumes.
pub const PROV_USED: &str = "http://www.w3.org/ns/prov#used";
/// `prov:generated`, linking a task to the logical files it produced.
pub const PROV_GENERATED: &str = "http://www.w3.org/ns/prov#generated";
/// `nie:dataSource`, linking a physical file to its logical file.
pub const NIE_DATA_SOURCE: &str = "http://www.semanticdesktop.org/ontologies/2007/01/19/nie#dataSource";
/// `nfo:FileDataObject`, the class of both logical and physical files.
pub const NFO_FILE_DATA_OBJECT: &str =
    "http://www.semanticdesktop.org/ontologies/2007/03/22/nfo#FileDataObject";
/// `nfo:fileName`.
pub const NFO_FILE_NAME: &str = "http://www.semanticdesktop.org/ontologies/2007/03/22/nfo#fileName";
/// `nfo:fileSize`.
pub const NFO_FILE_SIZE: &str = "http://www.semanticdesktop.org/ontologies/2007/03/22/nfo#fileSize";
/// `dct:format`.
pub const DCT_FORMAT: &str = "http://purl.org/dc/terms/format";
/// `dct:created`.
pub const DCT_CREATED: &str = "http://purl.org/dc/terms/created";
/// `dct:creator`.
pub const DCT_CREATOR: &str = "http://purl.org/dc/terms/creator";
/// `dbpedia:fileExtension`.
pub const DBPEDIA_FILE_EXTENSION: &str = "http://dbpedia.org/ontology/fileExtension";
/// `mu:uuid`.
pub const MU_UUID: &str = "http://mu.semte.ch/vocabularies/core/uuid";

/// Default graph for both task and file metadata.
pub const DEFAULT_GRAPH: &str = "http://mu.semte.ch/graphs/public";
/// Default base for minted logical file URIs.
pub const DEFAULT_FILE_RESOURCE_BASE: &str = "http://data.lblod.info/files/";
/// Media type recorded on generated delta files.
pub const DELTA_MEDIA_TYPE: &str = "application/json";

/// Status token for tasks waiting to be picked up.
pub const STATUS_NOT_STARTED: &str =
    "http://redpencil.data.gift/ttl-to-delta-tasks/8C7E9155-B467-49A4-B047-7764FE5401F7";
/// Status token for tasks being converted.
pub const STATUS_ONGOING: &str =
    "http://redpencil.data.gift/ttl-to-delta-tasks/B9418001-7DFE-40EF-8950-235349C2C7D1";
/// Status token for tasks whose files were all converted.
pub const STATUS_SUCCESSFUL: &str =
    "http://redpencil.data.gift/ttl-to-delta-tasks/89E2E19A-91D0-4932-9720-4D34E62B89A1";
/// Status token for tasks that hit an error.
pub const STATUS_FAILED: &str =
    "http://redpencil.data.gift/ttl-to-delta-tasks/B740E2A0-F8CC-443E-A6BE-248393A0A9AE";
