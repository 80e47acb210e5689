use std::io::Read;

// Import mimepart types.
use mimepart::Multipart;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Get a reader, the `Content-Type` and the boundary from somewhere e.g. a server request body.
    let (reader, content_type) = get_reader_from_somewhere();
    let boundary = mimepart::parse_boundary(content_type)?;

    // Create a `Multipart` instance from that reader and the boundary.
    let mut multipart = Multipart::new(reader, boundary);

    // Iterate over the parts, use `next_part()` to get the next part.
    while let Some(mut part) = multipart.next_part()? {
        // Get the part name and file name if provided in "Content-Disposition" header.
        let name = part.name().map(str::to_owned);
        let file_name = part.file_name().map(str::to_owned);

        println!("Name: {:?}, File Name: {:?}", name, file_name);

        // Read the body like any other byte stream.
        let mut content = Vec::new();
        part.read_to_end(&mut content)?;
        println!("Content: {:?}", String::from_utf8_lossy(&content));
    }

    Ok(())
}

fn get_reader_from_somewhere() -> (impl Read, &'static str) {
    let data = "--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"My Field\"\r\n\r\nabcd\r\n--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"File Field\"; filename=\"a-text-file.txt\"\r\nContent-Type: text/plain\r\n\r\nHello world\nHello\r\nWorld\rAgain\r\n--X-BOUNDARY--\r\n";

    (data.as_bytes(), "multipart/form-data; boundary=X-BOUNDARY")
}
