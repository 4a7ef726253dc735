//! PLY format support
//!
//! Reads the vertex element of ASCII and binary PLY files into a
//! [`PointSet`], and writes point sets back as binary little-endian PLY.
//! Records are decoded straight into the point set's columns; a binary record
//! is staged in one reusable buffer of `record_size` bytes.

use crate::schema::{AttributeSchema, Channel, ScalarType, SchemaBuilder, MAX_HEADER_PROPERTIES};
use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use log::{debug, info};
use pointclass_core::{Color, Error, Point3f, PointSet, Result, Vector3f};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Read, Write};
use std::ops::Range;
use std::path::Path;

pub const MAGIC: &str = "ply";
pub const END_HEADER: &str = "end_header";
pub const ASCII_FORMAT: &str = "format ascii 1.0";
pub const BINARY_LITTLE_ENDIAN_FORMAT: &str = "format binary_little_endian 1.0";
pub const BINARY_BIG_ENDIAN_FORMAT: &str = "format binary_big_endian 1.0";

/// Comment line emitted by [`PlyWriter`]
pub const WRITER_COMMENT: &str = "comment Generated by pointclass";

// Upper bound on column pre-allocation, so a corrupt vertex count fails with
// `TruncatedRecord` instead of exhausting memory up front.
const MAX_PREALLOCATED_POINTS: usize = 1 << 24;

/// Encoding of the record section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlyEncoding {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

impl PlyEncoding {
    /// Map the second header line to an encoding.
    ///
    /// Anything that is not ascii or explicitly big-endian is read as
    /// little-endian binary.
    pub fn from_format_line(line: &str) -> Self {
        match line {
            ASCII_FORMAT => PlyEncoding::Ascii,
            BINARY_BIG_ENDIAN_FORMAT => PlyEncoding::BinaryBigEndian,
            _ => PlyEncoding::BinaryLittleEndian,
        }
    }
}

/// Parsed PLY header
#[derive(Debug, Clone, PartialEq)]
pub struct PlyHeader {
    pub encoding: PlyEncoding,
    pub vertex_count: usize,
    pub schema: AttributeSchema,
    pub comments: Vec<String>,
}

/// A scalar read from a record, before it is stored into a column
#[derive(Debug, Clone, Copy, PartialEq)]
enum Scalar {
    Int(i64),
    Float(f64),
}

impl Scalar {
    fn decode<B: ByteOrder>(scalar: ScalarType, bytes: &[u8]) -> Self {
        match scalar {
            ScalarType::Int8 => Scalar::Int(bytes[0] as i8 as i64),
            ScalarType::UInt8 => Scalar::Int(bytes[0] as i64),
            ScalarType::Int16 => Scalar::Int(B::read_i16(bytes) as i64),
            ScalarType::UInt16 => Scalar::Int(B::read_u16(bytes) as i64),
            ScalarType::Int32 => Scalar::Int(B::read_i32(bytes) as i64),
            ScalarType::UInt32 => Scalar::Int(B::read_u32(bytes) as i64),
            ScalarType::Float32 => Scalar::Float(B::read_f32(bytes) as f64),
            ScalarType::Float64 => Scalar::Float(B::read_f64(bytes)),
        }
    }

    fn parse(scalar: ScalarType, token: &str) -> Option<Self> {
        if scalar.is_float() {
            return token.parse::<f64>().ok().map(Scalar::Float);
        }
        token
            .parse::<i64>()
            .ok()
            .map(Scalar::Int)
            .or_else(|| token.parse::<f64>().ok().map(Scalar::Float))
    }

    fn as_f32(self) -> f32 {
        match self {
            Scalar::Int(v) => v as f32,
            Scalar::Float(v) => v as f32,
        }
    }

    /// Narrow to 8 bits by keeping the low byte, as a C-style cast does
    fn as_u8(self) -> u8 {
        match self {
            Scalar::Int(v) => v as u8,
            Scalar::Float(v) => v as i64 as u8,
        }
    }
}

/// One decoded vertex
#[derive(Debug, Clone, Copy, Default)]
struct Record {
    position: [f32; 3],
    normal: [f32; 3],
    color: Color,
    view: u8,
    label: u8,
}

impl Record {
    fn set(&mut self, channel: Channel, value: Scalar) {
        match channel {
            Channel::X => self.position[0] = value.as_f32(),
            Channel::Y => self.position[1] = value.as_f32(),
            Channel::Z => self.position[2] = value.as_f32(),
            Channel::NormalX => self.normal[0] = value.as_f32(),
            Channel::NormalY => self.normal[1] = value.as_f32(),
            Channel::NormalZ => self.normal[2] = value.as_f32(),
            Channel::Red => self.color[0] = value.as_u8(),
            Channel::Green => self.color[1] = value.as_u8(),
            Channel::Blue => self.color[2] = value.as_u8(),
            Channel::View => self.view = value.as_u8(),
            Channel::Label => self.label = value.as_u8(),
            Channel::Ignored => {}
        }
    }
}

/// Column storage filled record by record
struct Columns {
    points: Vec<Point3f>,
    normals: Vec<Vector3f>,
    colors: Vec<Color>,
    views: Vec<u8>,
    labels: Vec<u8>,
}

impl Columns {
    fn for_schema(schema: &AttributeSchema, count: usize) -> Self {
        let capacity = count.min(MAX_PREALLOCATED_POINTS);
        let optional = |present: bool| if present { capacity } else { 0 };
        Self {
            points: Vec::with_capacity(capacity),
            normals: Vec::with_capacity(optional(schema.has_normals)),
            colors: Vec::with_capacity(optional(schema.has_colors())),
            views: Vec::with_capacity(optional(schema.has_views)),
            labels: Vec::with_capacity(optional(schema.has_labels())),
        }
    }

    fn push(&mut self, schema: &AttributeSchema, record: &Record) {
        let [x, y, z] = record.position;
        self.points.push(Point3f::new(x, y, z));
        if schema.has_normals {
            let [nx, ny, nz] = record.normal;
            self.normals.push(Vector3f::new(nx, ny, nz));
        }
        if schema.has_colors() {
            self.colors.push(record.color);
        }
        if schema.has_views {
            self.views.push(record.view);
        }
        if schema.has_labels() {
            self.labels.push(record.label);
        }
    }

    fn into_point_set(self) -> Result<PointSet> {
        PointSet::from_points(self.points)
            .with_normals(self.normals)?
            .with_colors(self.colors)?
            .with_views(self.views)?
            .with_labels(self.labels)
    }
}

/// Whitespace-separated tokens of the ASCII record section, read line by line
struct Tokens<R> {
    reader: R,
    line: String,
    pos: usize,
}

impl<R: BufRead> Tokens<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            pos: 0,
        }
    }

    fn next_token(&mut self) -> Result<Option<&str>> {
        match self.advance()? {
            Some(range) => Ok(Some(&self.line[range])),
            None => Ok(None),
        }
    }

    fn advance(&mut self) -> Result<Option<Range<usize>>> {
        loop {
            let rest = &self.line[self.pos..];
            let start = self.pos + (rest.len() - rest.trim_start().len());
            if start < self.line.len() {
                let len = self.line[start..]
                    .find(char::is_whitespace)
                    .unwrap_or(self.line.len() - start);
                self.pos = start + len;
                return Ok(Some(start..start + len));
            }

            self.line.clear();
            self.pos = 0;
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
        }
    }
}

/// Reader for the PLY container
pub struct PlyReader;

impl PlyReader {
    /// Read the vertex element of the PLY file at `path`
    pub fn read_point_set<P: AsRef<Path>>(path: P) -> Result<PointSet> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader, path)
    }

    /// Read a PLY stream; `source` is only used in error messages
    pub fn read_from<R: BufRead>(reader: &mut R, source: &Path) -> Result<PointSet> {
        let header = Self::read_header(reader, source)?;
        info!("Reading {} points from {}", header.vertex_count, source.display());

        match header.encoding {
            PlyEncoding::Ascii => Self::read_ascii(reader, &header),
            PlyEncoding::BinaryLittleEndian => {
                Self::read_binary::<_, LittleEndian>(reader, &header)
            }
            PlyEncoding::BinaryBigEndian => Self::read_binary::<_, BigEndian>(reader, &header),
        }
    }

    /// Parse the header, leaving `reader` positioned at the first record
    pub fn read_header<R: BufRead>(reader: &mut R, source: &Path) -> Result<PlyHeader> {
        let mut line = String::new();

        if !read_header_line(reader, &mut line)? || line != MAGIC {
            return Err(Error::invalid_header(source, "header does not start with ply"));
        }

        if !read_header_line(reader, &mut line)? {
            return Err(Error::invalid_header(source, "missing format line"));
        }
        let encoding = PlyEncoding::from_format_line(&line);

        let mut comments = Vec::new();
        loop {
            if !read_header_line(reader, &mut line)? {
                return Err(Error::invalid_header(source, "missing element vertex line"));
            }
            if let Some(comment) = line.strip_prefix("comment") {
                comments.push(comment.trim().to_string());
            } else if line.starts_with("obj_info") {
                continue;
            } else if line.starts_with("element") {
                break;
            } else {
                return Err(Error::invalid_header(
                    source,
                    format!("expected 'element vertex <count>', found '{}'", line),
                ));
            }
        }
        let vertex_count = parse_vertex_count(&line).ok_or_else(|| {
            Error::invalid_header(source, format!("invalid vertex line '{}'", line))
        })?;

        let mut builder = SchemaBuilder::new();
        for expected in ["x", "y", "z"] {
            if !read_header_line(reader, &mut line)? {
                return Err(Error::invalid_header(source, "unexpected end of header"));
            }
            match parse_scalar_property(&line) {
                Some((scalar, name)) if name == expected => builder.push(name, scalar),
                _ => {
                    return Err(Error::invalid_header(
                        source,
                        format!("expected 'property * {}', but found '{}'", expected, line),
                    ))
                }
            }
        }

        let mut in_vertex_element = true;
        let mut scanned = 0;
        loop {
            if !read_header_line(reader, &mut line)? {
                return Err(Error::invalid_header(source, "missing end_header"));
            }
            if line == END_HEADER {
                break;
            }

            scanned += 1;
            if scanned > MAX_HEADER_PROPERTIES {
                return Err(Error::invalid_header(
                    source,
                    format!("no end_header within {} lines after x/y/z", MAX_HEADER_PROPERTIES),
                ));
            }

            if let Some(comment) = line.strip_prefix("comment") {
                comments.push(comment.trim().to_string());
            } else if line.starts_with("element") {
                in_vertex_element = false;
            } else if in_vertex_element && line.starts_with("property") {
                let tokens: Vec<&str> = line.split_whitespace().collect();
                match tokens.as_slice() {
                    ["property", "list", ..] => {
                        return Err(Error::MalformedSchema(format!(
                            "list property on the vertex element: '{}'",
                            line
                        )))
                    }
                    ["property", ty, name] => {
                        let scalar = ScalarType::parse(ty).ok_or_else(|| {
                            Error::MalformedSchema(format!("unknown property type '{}'", ty))
                        })?;
                        builder.push(name, scalar);
                    }
                    _ => {
                        return Err(Error::invalid_header(
                            source,
                            format!("invalid property line '{}'", line),
                        ))
                    }
                }
            }
        }

        let schema = builder.finish()?;
        debug!(
            "PLY schema: {} properties, {} bytes per record, normals={}, colors={:?}, views={}, labels={:?}",
            schema.properties.len(),
            schema.record_size,
            schema.has_normals,
            schema.colors,
            schema.has_views,
            schema.label_dimension
        );

        Ok(PlyHeader {
            encoding,
            vertex_count,
            schema,
            comments,
        })
    }

    fn read_binary<R: Read, B: ByteOrder>(
        reader: &mut R,
        header: &PlyHeader,
    ) -> Result<PointSet> {
        let schema = &header.schema;
        let mut columns = Columns::for_schema(schema, header.vertex_count);
        let mut buf = vec![0u8; schema.record_size];

        for index in 0..header.vertex_count {
            if let Err(e) = reader.read_exact(&mut buf) {
                return Err(match e.kind() {
                    ErrorKind::UnexpectedEof => Error::TruncatedRecord {
                        index,
                        expected: header.vertex_count,
                    },
                    _ => Error::Io(e),
                });
            }

            let mut record = Record::default();
            for prop in &schema.properties {
                if prop.channel != Channel::Ignored {
                    let value = Scalar::decode::<B>(prop.scalar, &buf[prop.offset..]);
                    record.set(prop.channel, value);
                }
            }
            columns.push(schema, &record);
        }

        columns.into_point_set()
    }

    fn read_ascii<R: BufRead>(reader: &mut R, header: &PlyHeader) -> Result<PointSet> {
        let schema = &header.schema;
        let mut columns = Columns::for_schema(schema, header.vertex_count);
        let mut tokens = Tokens::new(reader);

        for index in 0..header.vertex_count {
            let mut record = Record::default();
            for prop in &schema.properties {
                let token = tokens.next_token()?.ok_or(Error::TruncatedRecord {
                    index,
                    expected: header.vertex_count,
                })?;
                if prop.channel == Channel::Ignored {
                    continue;
                }
                let value = Scalar::parse(prop.scalar, token).ok_or_else(|| Error::InvalidRecord {
                    index,
                    message: format!("cannot parse '{}' for property {}", token, prop.name),
                })?;
                record.set(prop.channel, value);
            }
            columns.push(schema, &record);
        }

        columns.into_point_set()
    }
}

/// Writer for binary little-endian PLY
pub struct PlyWriter;

impl PlyWriter {
    /// Write `set` to `path`, replacing any existing file
    pub fn write_point_set<P: AsRef<Path>>(set: &PointSet, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(set, &mut writer)?;
        writer.flush()?;
        info!("Wrote {} points to {}", set.len(), path.display());
        Ok(())
    }

    /// Write the header and records of `set`.
    ///
    /// Optional channels are emitted only when their column is non-empty, in
    /// the order normals, colors, views, labels.
    pub fn write_to<W: Write>(set: &PointSet, writer: &mut W) -> Result<()> {
        writeln!(writer, "{}", MAGIC)?;
        writeln!(writer, "{}", BINARY_LITTLE_ENDIAN_FORMAT)?;
        writeln!(writer, "{}", WRITER_COMMENT)?;
        writeln!(writer, "element vertex {}", set.len())?;
        writeln!(writer, "property float x")?;
        writeln!(writer, "property float y")?;
        writeln!(writer, "property float z")?;

        let has_normals = set.has_normals();
        let has_colors = set.has_colors();
        let has_views = set.has_views();
        let has_labels = set.has_labels();

        if has_normals {
            writeln!(writer, "property float nx")?;
            writeln!(writer, "property float ny")?;
            writeln!(writer, "property float nz")?;
        }
        if has_colors {
            writeln!(writer, "property uchar red")?;
            writeln!(writer, "property uchar green")?;
            writeln!(writer, "property uchar blue")?;
        }
        if has_views {
            writeln!(writer, "property uchar views")?;
        }
        if has_labels {
            writeln!(writer, "property uchar classification")?;
        }
        writeln!(writer, "{}", END_HEADER)?;

        for (i, point) in set.points().iter().enumerate() {
            writer.write_f32::<LittleEndian>(point.x)?;
            writer.write_f32::<LittleEndian>(point.y)?;
            writer.write_f32::<LittleEndian>(point.z)?;
            if has_normals {
                let normal = &set.normals()[i];
                writer.write_f32::<LittleEndian>(normal.x)?;
                writer.write_f32::<LittleEndian>(normal.y)?;
                writer.write_f32::<LittleEndian>(normal.z)?;
            }
            if has_colors {
                writer.write_all(&set.colors()[i])?;
            }
            if has_views {
                writer.write_u8(set.views()[i])?;
            }
            if has_labels {
                writer.write_u8(set.labels()[i])?;
            }
        }

        Ok(())
    }
}

/// Read one header line into `line` with the line terminator (and any
/// carriage return) stripped. Returns `false` at end of input.
fn read_header_line<R: BufRead>(reader: &mut R, line: &mut String) -> Result<bool> {
    line.clear();
    if reader.read_line(line)? == 0 {
        return Ok(false);
    }
    line.retain(|c| c != '\r' && c != '\n');
    Ok(true)
}

fn parse_vertex_count(line: &str) -> Option<usize> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        ["element", "vertex", count, ..] => count.parse::<usize>().ok(),
        _ => None,
    }
}

fn parse_scalar_property(line: &str) -> Option<(ScalarType, &str)> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        ["property", ty, name] => ScalarType::parse(ty).map(|scalar| (scalar, *name)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;
    use std::io::Cursor;

    fn source() -> &'static Path {
        Path::new("memory.ply")
    }

    fn read(bytes: &[u8]) -> Result<PointSet> {
        PlyReader::read_from(&mut Cursor::new(bytes), source())
    }

    fn header(encoding: &str, count: usize, extra: &[&str]) -> String {
        let mut h = format!(
            "ply\n{}\nelement vertex {}\nproperty float x\nproperty float y\nproperty float z\n",
            encoding, count
        );
        for line in extra {
            h.push_str(line);
            h.push('\n');
        }
        h.push_str("end_header\n");
        h
    }

    #[test]
    fn test_read_ascii_with_all_channels() {
        let mut content = header(
            ASCII_FORMAT,
            2,
            &[
                "property float nx",
                "property float ny",
                "property float nz",
                "property uchar red",
                "property uchar green",
                "property uchar blue",
                "property uchar views",
                "property uchar label",
            ],
        );
        content.push_str("0 1 2 0 0 1 255 128 0 3 6\n");
        content.push_str("3.5 4 5\n 0 1 0\n10 20 30 1 2\n");

        let set = read(content.as_bytes()).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.points()[0], Point3f::new(0.0, 1.0, 2.0));
        assert_eq!(set.points()[1], Point3f::new(3.5, 4.0, 5.0));
        assert_eq!(set.normals()[1], Vector3f::new(0.0, 1.0, 0.0));
        assert_eq!(set.colors(), &[[255, 128, 0], [10, 20, 30]]);
        assert_eq!(set.views(), &[3, 1]);
        assert_eq!(set.labels(), &[6, 2]);
    }

    #[test]
    fn test_ascii_narrows_wide_integers() {
        let mut content = header(
            ASCII_FORMAT,
            1,
            &[
                "property ushort red",
                "property ushort green",
                "property ushort blue",
                "property int class",
            ],
        );
        content.push_str("0 0 0 300 255 256 258\n");

        let set = read(content.as_bytes()).unwrap();
        assert_eq!(set.colors(), &[[44, 255, 0]]);
        assert_eq!(set.labels(), &[2]);
    }

    #[test]
    fn test_ascii_permuted_colors_stored_as_rgb() {
        let mut content = header(
            ASCII_FORMAT,
            1,
            &["property uchar blue", "property uchar green", "property uchar red"],
        );
        content.push_str("0 0 0 1 2 3\n");

        let set = read(content.as_bytes()).unwrap();
        assert_eq!(set.colors(), &[[3, 2, 1]]);
    }

    #[test]
    fn test_read_binary_little_endian_with_colors() {
        let mut bytes = header(
            BINARY_LITTLE_ENDIAN_FORMAT,
            2,
            &[
                "property uchar red",
                "property uchar green",
                "property uchar blue",
            ],
        )
        .into_bytes();
        for (p, c) in [([1.0f32, 2.0, 3.0], [9u8, 8, 7]), ([4.0, 5.0, 6.0], [1, 2, 3])] {
            for v in p {
                bytes.write_f32::<LittleEndian>(v).unwrap();
            }
            bytes.extend_from_slice(&c);
        }

        let set = read(&bytes).unwrap();
        assert_eq!(set.points()[1], Point3f::new(4.0, 5.0, 6.0));
        assert_eq!(set.colors(), &[[9, 8, 7], [1, 2, 3]]);
        assert!(!set.has_labels());
    }

    #[test]
    fn test_read_binary_big_endian_double_positions() {
        let mut bytes = b"ply\nformat binary_big_endian 1.0\nelement vertex 1\n\
property double x\nproperty double y\nproperty double z\nend_header\n"
            .to_vec();
        for v in [10.0f64, 20.0, 30.0] {
            bytes.write_f64::<BigEndian>(v).unwrap();
        }

        let set = read(&bytes).unwrap();
        assert_eq!(set.points()[0], Point3f::new(10.0, 20.0, 30.0));
    }

    #[test]
    fn test_unknown_properties_are_skipped() {
        let mut bytes = header(
            BINARY_LITTLE_ENDIAN_FORMAT,
            1,
            &["property double gps_time", "property uchar classification"],
        )
        .into_bytes();
        for v in [1.0f32, 2.0, 3.0] {
            bytes.write_f32::<LittleEndian>(v).unwrap();
        }
        bytes.write_f64::<LittleEndian>(12345.5).unwrap();
        bytes.write_u8(17).unwrap();

        let set = read(&bytes).unwrap();
        assert_eq!(set.labels(), &[17]);
    }

    #[test]
    fn test_truncated_binary_body() {
        let mut bytes = header(BINARY_LITTLE_ENDIAN_FORMAT, 3, &[]).into_bytes();
        // One full record and half of the second
        for v in [1.0f32, 2.0, 3.0, 4.0] {
            bytes.write_f32::<LittleEndian>(v).unwrap();
        }

        match read(&bytes) {
            Err(Error::TruncatedRecord { index, expected }) => {
                assert_eq!(index, 1);
                assert_eq!(expected, 3);
            }
            other => panic!("expected TruncatedRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_ascii_body() {
        let mut content = header(ASCII_FORMAT, 2, &[]);
        content.push_str("1 2 3\n4 5\n");
        assert!(matches!(
            read(content.as_bytes()),
            Err(Error::TruncatedRecord { index: 1, .. })
        ));
    }

    #[test]
    fn test_garbled_ascii_token() {
        let mut content = header(ASCII_FORMAT, 1, &[]);
        content.push_str("1 two 3\n");
        assert!(matches!(
            read(content.as_bytes()),
            Err(Error::InvalidRecord { index: 0, .. })
        ));
    }

    #[test]
    fn test_header_errors() {
        assert!(matches!(read(b"not_ply\n"), Err(Error::InvalidHeader { .. })));
        assert!(matches!(
            read(b"ply\nformat ascii 1.0\nproperty float x\n"),
            Err(Error::InvalidHeader { .. })
        ));
        assert!(matches!(
            read(b"ply\nformat ascii 1.0\nelement vertex many\n"),
            Err(Error::InvalidHeader { .. })
        ));
        assert!(matches!(
            read(b"ply\nformat ascii 1.0\nelement face 3\n"),
            Err(Error::InvalidHeader { .. })
        ));
    }

    #[test]
    fn test_missing_position_property_names_expectation() {
        let content = "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nproperty float z\n";
        match read(content.as_bytes()) {
            Err(Error::InvalidHeader { message, .. }) => {
                assert!(message.contains("property * y"));
                assert!(message.contains("property float z"));
            }
            other => panic!("expected InvalidHeader, got {:?}", other),
        }
    }

    #[test]
    fn test_crlf_header_and_comments() {
        let content = "ply\r\nformat ascii 1.0\r\ncomment made by hand\r\nelement vertex 1\r\n\
property float x\r\nproperty float y\r\nproperty float z\r\nend_header\r\n1 2 3\r\n";
        let mut cursor = Cursor::new(content.as_bytes());
        let header = PlyReader::read_header(&mut cursor, source()).unwrap();
        assert_eq!(header.encoding, PlyEncoding::Ascii);
        assert_eq!(header.comments, vec!["made by hand".to_string()]);

        let set = read(content.as_bytes()).unwrap();
        assert_eq!(set.points()[0], Point3f::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_other_format_strings_read_as_little_endian() {
        assert_eq!(
            PlyEncoding::from_format_line("format binary 2.0"),
            PlyEncoding::BinaryLittleEndian
        );
        assert_eq!(PlyEncoding::from_format_line(ASCII_FORMAT), PlyEncoding::Ascii);
    }

    #[test]
    fn test_header_scan_guard() {
        let extra: Vec<String> = (0..=MAX_HEADER_PROPERTIES)
            .map(|i| format!("property uchar extra_{}", i))
            .collect();
        let extra: Vec<&str> = extra.iter().map(String::as_str).collect();
        let content = header(ASCII_FORMAT, 0, &extra);
        assert!(matches!(read(content.as_bytes()), Err(Error::InvalidHeader { .. })));
    }

    #[test]
    fn test_later_elements_do_not_extend_vertex_schema() {
        let mut content = header(
            ASCII_FORMAT,
            1,
            &["element face 1", "property list uchar int vertex_indices"],
        );
        content.push_str("1 2 3\n3 0 0 0\n");
        let set = read(content.as_bytes()).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_vertex_list_property_rejected() {
        let content = header(ASCII_FORMAT, 1, &["property list uchar int vertex_indices"]);
        assert!(matches!(read(content.as_bytes()), Err(Error::MalformedSchema(_))));
    }

    #[test]
    fn test_non_contiguous_color_header_rejected() {
        let content = header(
            BINARY_LITTLE_ENDIAN_FORMAT,
            1,
            &[
                "property uchar red",
                "property uchar blue",
                "property uchar alpha",
                "property uchar green",
            ],
        );
        assert!(matches!(read(content.as_bytes()), Err(Error::MalformedSchema(_))));
    }

    #[test]
    fn test_writer_header_lists_present_channels_in_order() {
        let set = PointSet::from_points(vec![Point3f::new(1.0, 2.0, 3.0)])
            .with_labels(vec![4])
            .unwrap()
            .with_colors(vec![[1, 2, 3]])
            .unwrap();

        let mut bytes = Vec::new();
        PlyWriter::write_to(&set, &mut bytes).unwrap();

        let expected_header = "ply\nformat binary_little_endian 1.0\ncomment Generated by pointclass\n\
element vertex 1\nproperty float x\nproperty float y\nproperty float z\n\
property uchar red\nproperty uchar green\nproperty uchar blue\n\
property uchar classification\nend_header\n";
        assert!(bytes.starts_with(expected_header.as_bytes()));
        assert_eq!(bytes.len(), expected_header.len() + 12 + 3 + 1);
        assert_eq!(&bytes[bytes.len() - 4..], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_write_then_read_is_identity() {
        let set = PointSet::from_points(vec![
            Point3f::new(0.5, -1.25, 3.0),
            Point3f::new(1e6, 2e-3, -7.0),
        ])
        .with_normals(vec![Vector3f::new(0.0, 0.0, 1.0), Vector3f::new(0.6, 0.8, 0.0)])
        .unwrap()
        .with_colors(vec![[0, 127, 255], [12, 34, 56]])
        .unwrap()
        .with_views(vec![0, 200])
        .unwrap()
        .with_labels(vec![255, 1])
        .unwrap();

        let mut bytes = Vec::new();
        PlyWriter::write_to(&set, &mut bytes).unwrap();
        assert_eq!(read(&bytes).unwrap(), set);
    }
}
