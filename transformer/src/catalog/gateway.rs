//! Media-gateway counter catalog.
//!
//! Gateway counters are reported over 900-second measurement windows;
//! bandwidth KPIs convert the octet counters to Mbit/s, and the Hi/Lo
//! counter pairs combine 32-bit halves that wrap at 2^31.

use crate::models::{Catalog, Formula, KpiDefinition, KpiFamily};
use crate::utils::TransformResult;

/// Octets per 900 s window to Mbit/s.
const MBITS_PER_WINDOW: f64 = 8.0 / (1_000_000.0 * 900.0);

/// SCTP chunk counters to signalling bandwidth (chunk size estimate baked
/// into the original reporting chain).
const SIG_BW_SCALE: f64 = MBITS_PER_WINDOW * 100.0 * 1.2;

fn ratio(scale: f64) -> Formula {
    Formula::RatioOfSums { scale, complement: false }
}

fn complement_ratio(scale: f64) -> Formula {
    Formula::RatioOfSums { scale, complement: true }
}

pub fn catalog() -> TransformResult<Catalog> {
    let kpis = vec![
        KpiDefinition::new("RateOfLowJitterStream", complement_ratio(100.0))
            .numerator(&[
                "pmVoIpConnMeasuredJitter4",
                "pmVoIpConnMeasuredJitter5",
                "pmVoIpConnMeasuredJitter6",
                "pmVoIpConnMeasuredJitter7",
                "pmVoIpConnMeasuredJitter8",
            ])
            .denominator(&[
                "pmVoIpConnMeasuredJitter0",
                "pmVoIpConnMeasuredJitter1",
                "pmVoIpConnMeasuredJitter2",
                "pmVoIpConnMeasuredJitter3",
                "pmVoIpConnMeasuredJitter4",
                "pmVoIpConnMeasuredJitter5",
                "pmVoIpConnMeasuredJitter6",
                "pmVoIpConnMeasuredJitter7",
                "pmVoIpConnMeasuredJitter8",
            ])
            .per_suffix()
            .family("Quality"),
        KpiDefinition::new("LatePktsRatio", complement_ratio(100.0))
            .numerator(&[
                "pmVoIpConnLatePktsRatio4",
                "pmVoIpConnLatePktsRatio5",
                "pmVoIpConnLatePktsRatio6",
            ])
            .denominator(&[
                "pmVoIpConnLatePktsRatio0",
                "pmVoIpConnLatePktsRatio1",
                "pmVoIpConnLatePktsRatio2",
                "pmVoIpConnLatePktsRatio3",
                "pmVoIpConnLatePktsRatio4",
                "pmVoIpConnLatePktsRatio5",
                "pmVoIpConnLatePktsRatio6",
            ])
            .per_suffix()
            .family("Quality"),
        KpiDefinition::new("NoDisturbJitter", complement_ratio(100.0))
            .numerator(&["pmIpCnConnMeasuredJitter5"])
            .denominator(&[
                "pmIpCnConnMeasuredJitter0",
                "pmIpCnConnMeasuredJitter1",
                "pmIpCnConnMeasuredJitter2",
                "pmIpCnConnMeasuredJitter3",
                "pmIpCnConnMeasuredJitter4",
                "pmIpCnConnMeasuredJitter5",
            ])
            .per_suffix()
            .family("Quality"),
        KpiDefinition::new("IPQoS", complement_ratio(100.0))
            .numerator(&[
                "pmIpInDiscards",
                "pmIpOutDiscards",
                "pmIpInAddrErrors",
                "pmIpInHdrErrors",
                "pmIpInUnknownProtos",
            ])
            .denominator(&["pmIpInReceives", "pmIpOutRequests"])
            .per_suffix()
            .family("Quality"),
        KpiDefinition::new("PktLoss", Formula::SumOverHiLoTotal { scale: 100.0 })
            .numerator(&["pmRtpDiscardedPkts", "pmRtpLostPkts"])
            .denominator(&["pmRtpReceivedPktsHi", "pmRtpReceivedPktsLo", "pmRtpLostPkts"])
            .per_suffix()
            .family("Quality"),
        KpiDefinition::new("UseOfLicence", ratio(100.0))
            .numerator(&["pmNrOfMeStChUsedVoip"])
            .denominator(&["maxNrOfLicMediaStreamChannelsVoip"])
            .per_suffix()
            .family("Traffic"),
        KpiDefinition::new("MediaStreamChannelUtilisationRate", ratio(100.0))
            .numerator(&["pmNrOfMediaStreamChannelsBusy"])
            .denominator(&["maxNrOfLicMediaStreamChannels"])
            .per_suffix()
            .family("Traffic"),
        KpiDefinition::new(
            "ReceivedBwLink1WithHeaders",
            Formula::CombineHiLo { scale: MBITS_PER_WINDOW },
        )
        .numerator(&["pmIfInOctetsLink1Hi", "pmIfInOctetsLink1Lo"])
        .per_suffix()
        .family("Traffic"),
        KpiDefinition::new(
            "ReceivedBwLink2WithHeaders",
            Formula::CombineHiLo { scale: MBITS_PER_WINDOW },
        )
        .numerator(&["pmIfInOctetsLink2Hi", "pmIfInOctetsLink2Lo"])
        .per_suffix()
        .family("Traffic"),
        KpiDefinition::new(
            "TransBwLink1WithHeaders",
            Formula::CombineHiLo { scale: MBITS_PER_WINDOW },
        )
        .numerator(&["pmIfOutOctetsLink1Hi", "pmIfOutOctetsLink1Lo"])
        .per_suffix()
        .family("Traffic"),
        KpiDefinition::new(
            "TransBwLink2WithHeaders",
            Formula::CombineHiLo { scale: MBITS_PER_WINDOW },
        )
        .numerator(&["pmIfOutOctetsLink2Hi", "pmIfOutOctetsLink2Lo"])
        .per_suffix()
        .family("Traffic"),
        KpiDefinition::new("TotalBwForSig", Formula::LinearOfSum { scale: SIG_BW_SCALE, offset: 0.0 })
            .numerator(&["pmSctpStatSentChunks", "pmSctpStatRetransChunks"])
            .per_suffix()
            .family("Traffic"),
        KpiDefinition::new(
            "IPBCPestablishSuccessRate",
            Formula::SumOverPositionalDifference { scale: 100.0, complement: true },
        )
        .numerator(&[
            "pmNrOfRecIpbcpRejectMsg",
            "pmNrOfSentIpbcpRejectMsg",
            "pmNrOfRecIpbcpConfusedMsg",
            "pmNrOfRecFaultyIpbcpAcceptMsg",
            "pmNrOfOrigIpbcpBearSupervTmrExp",
            "pmNrOfTermIpbcpBearSupervTmrExp",
            "pmNrOfRecBctpProtocolFailures",
        ])
        .denominator(&["pmNrOfIpTermsReq", "pmNrOfIpTermsRej"])
        .per_suffix()
        .family("Success"),
        KpiDefinition::new("IPTerminationSuccessRate", complement_ratio(100.0))
            .numerator(&["pmNrOfIpTermsRej"])
            .denominator(&["pmNrOfIpTermsReq"])
            .per_suffix()
            .family("Success"),
        KpiDefinition::new("IPInDiscards", ratio(100.0))
            .numerator(&["pmIfStatsIpInDiscards"])
            .denominator(&["pmIfStatsIpInReceives"])
            .per_suffix()
            .family("Errors"),
        KpiDefinition::new("IPOutDiscards", ratio(100.0))
            .numerator(&["pmIfStatsIpOutDiscards"])
            .denominator(&["pmIfStatsIpOutRequests"])
            .per_suffix()
            .family("Errors"),
        KpiDefinition::new("pmRtpReceivedPkts", Formula::CombineHiLo { scale: 1.0 })
            .numerator(&["pmRtpReceivedPktsHi", "pmRtpReceivedPktsLo"])
            .per_suffix(),
        KpiDefinition::new("NbIPTermination", Formula::PositionalDifference)
            .numerator(&["pmNrOfIpTermsReq", "pmNrOfIpTermsRej"])
            .per_suffix(),
        KpiDefinition::new("LatePktsVoIp", ratio(100.0))
            .numerator(&["pmLatePktsVoIp"])
            .denominator(&["pmLatePktsVoIp", "pmSuccTransmittedPktsVoIp"])
            .per_suffix(),
        KpiDefinition::new("Pb_IpDatagrams", Formula::LinearOfSum { scale: 1.0, offset: 0.0 })
            .numerator(&[
                "pmNoOfHdrErrors",
                "pmNoOfIpAddrErrors",
                "pmNoOfIpInDiscards",
                "pmNoOfIpOutDiscards",
            ])
            .per_suffix(),
    ];

    let families = vec![
        KpiFamily::new(
            "Quality",
            &["RateOfLowJitterStream", "LatePktsRatio", "NoDisturbJitter", "IPQoS", "PktLoss"],
        ),
        KpiFamily::new(
            "Traffic",
            &[
                "UseOfLicence",
                "MediaStreamChannelUtilisationRate",
                "ReceivedBwLink1WithHeaders",
                "ReceivedBwLink2WithHeaders",
                "TransBwLink1WithHeaders",
                "TransBwLink2WithHeaders",
                "TotalBwForSig",
            ],
        ),
        KpiFamily::new("Success", &["IPBCPestablishSuccessRate", "IPTerminationSuccessRate"]),
        KpiFamily::new("Errors", &["IPInDiscards", "IPOutDiscards"]),
    ];

    Catalog::new(kpis, families)
}
