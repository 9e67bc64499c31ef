use super::header::{
    Header, ADDITIONAL_COUNT_OFFSET, ANSWER_COUNT_OFFSET, AUTHORITY_COUNT_OFFSET, FLAGS_OFFSET,
    HEADER_LEN,
};
use super::record::{read_record, write_record};
use super::{PacketBuffer, Question, WireError};
use emberdns_domain::{RecordType, ResourceRecord, ResponseCode};

/// A full DNS message: header, questions and the three record sections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    pub header: Header,
    pub questions: Vec<Question>,
    pub answers: Vec<ResourceRecord>,
    pub authorities: Vec<ResourceRecord>,
    pub additionals: Vec<ResourceRecord>,
}

impl Message {
    /// A recursion-desired query for one question.
    pub fn query(id: u16, name: &str, record_type: RecordType) -> Self {
        Self {
            header: Header {
                id,
                recursion_desired: true,
                question_count: 1,
                ..Default::default()
            },
            questions: vec![Question::new(name, record_type)],
            ..Default::default()
        }
    }

    /// Response skeleton echoing the inbound id and question, QR=1, RD
    /// copied from the request and RA advertised.
    pub fn response_to(request: &Message, rcode: ResponseCode) -> Self {
        Self {
            header: Header {
                id: request.header.id,
                response: true,
                opcode: request.header.opcode,
                recursion_desired: request.header.recursion_desired,
                recursion_available: true,
                rcode,
                question_count: request.questions.len() as u16,
                ..Default::default()
            },
            questions: request.questions.clone(),
            ..Default::default()
        }
    }

    pub fn with_answers(mut self, answers: Vec<ResourceRecord>) -> Self {
        self.header.answer_count = answers.len() as u16;
        self.answers = answers;
        self
    }

    pub fn question(&self) -> Option<&Question> {
        self.questions.first()
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, WireError> {
        if data.len() < HEADER_LEN {
            return Err(WireError::TruncatedHeader);
        }

        let mut buffer = PacketBuffer::from_bytes(data)?;
        let header = Header::read(&mut buffer)?;

        let mut questions = Vec::with_capacity(usize::from(header.question_count));
        for _ in 0..header.question_count {
            questions.push(Question::read(&mut buffer)?);
        }

        let mut answers = Vec::with_capacity(usize::from(header.answer_count));
        for _ in 0..header.answer_count {
            answers.push(read_record(&mut buffer)?);
        }

        let mut authorities = Vec::with_capacity(usize::from(header.authority_count));
        for _ in 0..header.authority_count {
            authorities.push(read_record(&mut buffer)?);
        }

        let mut additionals = Vec::with_capacity(usize::from(header.additional_count));
        for _ in 0..header.additional_count {
            additionals.push(read_record(&mut buffer)?);
        }

        Ok(Self {
            header,
            questions,
            answers,
            authorities,
            additionals,
        })
    }

    /// Serializes into one UDP payload. Records that do not fit in the
    /// 512-byte packet are dropped and the TC bit is set, so the client
    /// learns the answer was cut short instead of receiving garbage.
    pub fn to_bytes(&self) -> Result<Vec<u8>, WireError> {
        let mut buffer = PacketBuffer::new();
        self.header.write(&mut buffer)?;

        for question in &self.questions {
            question.write(&mut buffer)?;
        }

        let mut truncated = false;
        let mut written = [0u16; 3];

        let sections: [&[ResourceRecord]; 3] =
            [&self.answers, &self.authorities, &self.additionals];
        'sections: for (idx, section) in sections.iter().enumerate() {
            for record in section.iter() {
                let rollback = buffer.pos();
                if write_record(&mut buffer, record).is_err() {
                    buffer.seek(rollback);
                    truncated = true;
                    break 'sections;
                }
                written[idx] += 1;
            }
        }

        buffer.set_u16(ANSWER_COUNT_OFFSET, written[0])?;
        buffer.set_u16(AUTHORITY_COUNT_OFFSET, written[1])?;
        buffer.set_u16(ADDITIONAL_COUNT_OFFSET, written[2])?;

        if truncated {
            let len = buffer.pos();
            buffer.seek(FLAGS_OFFSET);
            let flags = buffer.read_u16()?;
            buffer.set_u16(FLAGS_OFFSET, flags | (1 << 9))?; // TC
            buffer.seek(len);
        }

        Ok(buffer.as_slice().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emberdns_domain::RecordData;
    use std::net::Ipv4Addr;

    #[test]
    fn test_query_round_trip() {
        let query = Message::query(0x4242, "example.com", RecordType::A);
        let bytes = query.to_bytes().unwrap();

        let parsed = Message::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.header.id, 0x4242);
        assert!(parsed.header.recursion_desired);
        assert!(!parsed.header.response);
        let question = parsed.question().unwrap();
        assert_eq!(question.name, "example.com");
        assert_eq!(question.record_type(), Some(RecordType::A));
    }

    #[test]
    fn test_response_echoes_id_and_question() {
        let query = Message::query(777, "example.com", RecordType::A);
        let response = Message::response_to(&query, ResponseCode::NoError).with_answers(vec![
            ResourceRecord::new(
                "example.com",
                300,
                RecordData::A(Ipv4Addr::new(93, 184, 216, 34)),
            ),
        ]);

        let parsed = Message::from_bytes(&response.to_bytes().unwrap()).unwrap();
        assert_eq!(parsed.header.id, 777);
        assert!(parsed.header.response);
        assert!(parsed.header.recursion_available);
        assert_eq!(parsed.header.rcode, ResponseCode::NoError);
        assert_eq!(parsed.question().unwrap().name, "example.com");
        assert_eq!(parsed.answers.len(), 1);
    }

    #[test]
    fn test_refused_response_carries_rcode_5() {
        let query = Message::query(9, "burst.example.com", RecordType::A);
        let response = Message::response_to(&query, ResponseCode::Refused);
        let bytes = response.to_bytes().unwrap();

        // low nibble of flags byte 3
        assert_eq!(bytes[3] & 0x0F, 5);
    }

    #[test]
    fn test_short_datagram_rejected() {
        assert_eq!(
            Message::from_bytes(&[0u8; 4]),
            Err(WireError::TruncatedHeader)
        );
    }

    #[test]
    fn test_overflowing_answers_set_tc() {
        let query = Message::query(1, "example.com", RecordType::TXT);
        let big_txt = ResourceRecord::new(
            "example.com",
            60,
            RecordData::Txt("x".repeat(200)),
        );
        let response = Message::response_to(&query, ResponseCode::NoError)
            .with_answers(vec![big_txt.clone(), big_txt.clone(), big_txt.clone()]);

        let bytes = response.to_bytes().unwrap();
        assert!(bytes.len() <= super::super::PACKET_SIZE);

        let parsed = Message::from_bytes(&bytes).unwrap();
        assert!(parsed.header.truncated);
        assert!(parsed.answers.len() < 3);
        assert_eq!(
            usize::from(parsed.header.answer_count),
            parsed.answers.len()
        );
    }
}
