use crate::document::SourceText;
use crate::parser::{parse_document, ParsedDocument};
use std::sync::OnceLock;

/// A customer inquiry display file with two formats, continuation markers,
/// comments, and usages on both sides of their declarations.
const SAMPLE_SOURCE: &str = "\
     A*%%TS  SD  20240312  101512  DEVUSER     REL-V7R4M0  5770-WDS
     A                                      DSPSIZ(24 80 *DS3)
     A                                      CA03(03 'Exit')
     A          R PROMPT
     A                                  1  2'Customer inquiry'
     A  CUSTNO         7S 0B  3 20DSPATR(&CUSTATR)
     A  CUSTATR        1A  P          ALIAS(CUSTOMER_ATTRIBUTE)
     A* Message line
     A  MSGTXT        70A  O 24  2DSPATR(&MSGATR) §|§
     A  MSGATR         1A  P          ALIAS(MESSAGE_ATTRIBUTE)
     A          R DETAIL
     A  CUSTNM        30A  O  5 20DSPATR(&NAMEATR)
     A  NAMEATR        1A  P          ALIAS(NAME_ATTRIBUTE)
     A  CUSTAD        30A  O  6 20DSPATR(&NAMEATR)
     A  ORPHAN         1A  O  7 20DSPATR(&CUSTATR)
";

struct SampleFixture {
    document: ParsedDocument,
    source: SourceText,
}

static SAMPLE_FIXTURE: OnceLock<SampleFixture> = OnceLock::new();

fn sample_fixture() -> &'static SampleFixture {
    SAMPLE_FIXTURE.get_or_init(|| {
        let source = SourceText::new(SAMPLE_SOURCE);
        let document = parse_document(&source);
        SampleFixture { document, source }
    })
}

pub fn sample_document() -> ParsedDocument {
    sample_fixture().document.clone()
}

pub fn sample_lines() -> &'static SourceText {
    &sample_fixture().source
}

pub fn sample_source() -> &'static str {
    SAMPLE_SOURCE
}
